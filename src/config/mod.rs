use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Port the Competitive Companion browser extension pushes problems to.
/// Fixed by the extension's default configuration; change both sides or neither.
const DEFAULT_COMPANION_PORT: u16 = 27121;
const DEFAULT_EDITOR_PORT: u16 = 27122;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── LanguageConfig ───────────────────────────────────────────────────────────

/// Language preferences (`[languages]` in config.toml).
///
/// `extensions` maps a language name to its source-file extension;
/// `judge_ids` maps the same names to the numeric language id the judge's
/// submission form expects. Both maps ship with defaults covering the
/// languages the judge view knows how to run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language name → source file extension (no leading dot).
    pub extensions: BTreeMap<String, String>,
    /// Language name → judge-site language id used when staging a submission.
    pub judge_ids: BTreeMap<String, i64>,
    /// Skip the language quick-pick and always use this language.
    /// None = ask on every new problem.
    pub default_language: Option<String>,
    /// Template file inserted into newly created sources when a default
    /// language is set. None = no template.
    pub template_file: Option<PathBuf>,
    /// Quick-pick entries, in menu order. Entries without a known extension
    /// are dropped from the menu.
    pub menu_choices: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        let extensions: BTreeMap<String, String> = [
            ("c", "c"),
            ("cpp", "cpp"),
            ("csharp", "cs"),
            ("go", "go"),
            ("haskell", "hs"),
            ("java", "java"),
            ("js", "js"),
            ("python", "py"),
            ("ruby", "rb"),
            ("rust", "rs"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let judge_ids: BTreeMap<String, i64> = [
            ("c", 43),
            ("cpp", 54),
            ("csharp", 9),
            ("go", 32),
            ("haskell", 12),
            ("java", 36),
            ("js", 34),
            ("python", 31),
            ("ruby", 67),
            ("rust", 75),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let menu_choices = ["cpp", "python", "java", "c", "rust", "go", "js"]
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            extensions,
            judge_ids,
            default_language: None,
            template_file: None,
            menu_choices,
        }
    }
}

impl LanguageConfig {
    /// Extension for a language name, if the language is known.
    pub fn extension_for(&self, language: &str) -> Option<&str> {
        self.extensions.get(language).map(String::as_str)
    }

    /// Judge language id for a source-file extension (reverse lookup through
    /// the extension map).
    pub fn judge_id_for_extension(&self, ext: &str) -> Option<i64> {
        let language = self
            .extensions
            .iter()
            .find(|(_, e)| e.as_str() == ext)
            .map(|(lang, _)| lang)?;
        self.judge_ids.get(language).copied()
    }
}

// ─── TOML file shape ──────────────────────────────────────────────────────────

/// On-disk shape of `{data_dir}/config.toml`. Every field optional so a
/// partial file (or none at all) still loads.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    companion_port: Option<u16>,
    editor_port: Option<u16>,
    bind_address: Option<String>,
    log: Option<String>,
    log_format: Option<String>,
    /// Prepend a comment header (problem name, url, limits) to new sources.
    header_comments: Option<bool>,
    /// Name Codeforces sources after the problem's url slug instead of its title.
    short_codeforces_names: Option<bool>,
    languages: Option<LanguageConfig>,
}

// ─── CompanionConfig ──────────────────────────────────────────────────────────

/// Resolved daemon configuration. Precedence: CLI/env > config.toml > default.
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    /// Port the companion listener binds (browser-extension wire contract).
    pub companion_port: u16,
    /// Port the editor REST API binds.
    pub editor_port: u16,
    /// Bind address for both listeners.
    pub bind_address: String,
    /// Data directory holding config.toml and logs.
    pub data_dir: PathBuf,
    pub log_level: String,
    /// "compact" or "json".
    pub log_format: String,
    pub header_comments: bool,
    pub short_codeforces_names: bool,
    pub languages: LanguageConfig,
}

impl CompanionConfig {
    /// Load config.toml from `data_dir` (if present) and apply overrides.
    pub fn new(
        companion_port: Option<u16>,
        editor_port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let toml_cfg = load_toml(&data_dir.join("config.toml"));

        Self {
            companion_port: companion_port
                .or(toml_cfg.companion_port)
                .unwrap_or(DEFAULT_COMPANION_PORT),
            editor_port: editor_port
                .or(toml_cfg.editor_port)
                .unwrap_or(DEFAULT_EDITOR_PORT),
            bind_address: toml_cfg.bind_address.unwrap_or_else(default_bind_address),
            data_dir,
            log_level: log.or(toml_cfg.log).unwrap_or_else(|| "info".to_string()),
            log_format: toml_cfg.log_format.unwrap_or_else(|| "compact".to_string()),
            header_comments: toml_cfg.header_comments.unwrap_or(false),
            short_codeforces_names: toml_cfg.short_codeforces_names.unwrap_or(false),
            languages: toml_cfg.languages.unwrap_or_default(),
        }
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

fn load_toml(path: &Path) -> TomlConfig {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return TomlConfig::default();
    };
    match toml::from_str(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), "config.toml is invalid, using defaults: {e}");
            TomlConfig::default()
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("companiond");
        }
    }
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("companiond");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("companiond");
        }
    }
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("companiond");
        }
    }
    PathBuf::from(".companiond")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let cfg = CompanionConfig::new(None, None, Some(dir.path().to_path_buf()), None);
        assert_eq!(cfg.companion_port, 27121);
        assert_eq!(cfg.editor_port, 27122);
        assert_eq!(cfg.bind_address, "127.0.0.1");
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.header_comments);
        assert!(!cfg.short_codeforces_names);
        assert!(cfg.languages.default_language.is_none());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
companion_port = 4244
header_comments = true

[languages]
default_language = "python"
"#,
        )
        .unwrap();
        let cfg = CompanionConfig::new(None, None, Some(dir.path().to_path_buf()), None);
        assert_eq!(cfg.companion_port, 4244);
        assert!(cfg.header_comments);
        assert_eq!(cfg.languages.default_language.as_deref(), Some("python"));
        // Unspecified [languages] fields fall back to defaults.
        assert_eq!(cfg.languages.extension_for("python"), Some("py"));
    }

    #[test]
    fn cli_overrides_beat_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "companion_port = 4244\n").unwrap();
        let cfg = CompanionConfig::new(Some(5000), None, Some(dir.path().to_path_buf()), None);
        assert_eq!(cfg.companion_port, 5000);
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "not [valid toml").unwrap();
        let cfg = CompanionConfig::new(None, None, Some(dir.path().to_path_buf()), None);
        assert_eq!(cfg.companion_port, 27121);
    }

    #[test]
    fn judge_id_reverse_lookup_by_extension() {
        let langs = LanguageConfig::default();
        assert_eq!(langs.judge_id_for_extension("py"), Some(31));
        assert_eq!(langs.judge_id_for_extension("cpp"), Some(54));
        assert_eq!(langs.judge_id_for_extension("zig"), None);
    }
}
