use anyhow::Result;
use clap::Parser;
use companiond::{companion, config::CompanionConfig, editor, AppContext};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "companiond",
    about = "Companion Host — local relay between the browser extension and the editor judge view",
    version
)]
struct Args {
    /// Companion listener port (the browser extension's push/poll endpoint)
    #[arg(long, env = "COMPANIOND_PORT")]
    port: Option<u16>,

    /// Editor REST API port
    #[arg(long, env = "COMPANIOND_EDITOR_PORT")]
    editor_port: Option<u16>,

    /// Data directory for config.toml and logs
    #[arg(long, env = "COMPANIOND_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "COMPANIOND_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "COMPANIOND_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CompanionConfig::new(args.port, args.editor_port, args.data_dir, args.log);
    let _log_guard = setup_logging(
        &config.log_level,
        args.log_file.as_deref(),
        &config.log_format,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "companiond starting"
    );

    let ctx = AppContext::new(config);

    // The companion listener is non-fatal: a taken port means the browser
    // extension cannot reach us, but the editor surface keeps working.
    let companion_ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = companion::start_companion_server(companion_ctx).await {
            warn!("companion listener disabled: {e:#}");
        }
    });

    editor::rest::start_editor_server(ctx).await
}

fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("companiond.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        if use_json {
            tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        } else {
            tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        }
        None
    }
}
