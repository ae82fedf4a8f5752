// SPDX-License-Identifier: MIT
//! Submission launchers — fire-and-forget adapters around external judge
//! submission tools.
//!
//! Two adapters: the generic `cf` tool (Codeforces-style judges) and the
//! Kattis `submit.py` script. Both are one-shot, never retried, and never
//! fatal to the daemon.

use anyhow::{bail, Context as _, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::editor::JudgeViewEvent;
use crate::mailbox::PendingSubmission;
use crate::problem::naming;
use crate::AppContext;

// ─── Tool outcome ─────────────────────────────────────────────────────────────

/// Result of one tool invocation, with exit status, stdout, and stderr
/// already multiplexed so call sites read as straight-line code.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Exit code 0; carries captured stdout.
    Success(String),
    /// Spawn failure or non-zero exit; carries the error output.
    Failure(String),
}

/// Spawn a tool, optionally feed it stdin, and wait for completion.
async fn run_tool(program: &str, args: &[&str], stdin: Option<&str>) -> ToolOutcome {
    debug!(program, ?args, "launching submission tool");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return ToolOutcome::Failure(format!("failed to launch {program}: {e}")),
    };

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        if let Err(e) = pipe.write_all(input.as_bytes()).await {
            return ToolOutcome::Failure(format!("failed to write to {program} stdin: {e}"));
        }
        // Dropping the pipe closes stdin so interactive tools stop waiting.
        drop(pipe);
    }

    match child.wait_with_output().await {
        Ok(output) if output.status.success() => {
            ToolOutcome::Success(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            ToolOutcome::Failure(if stderr.is_empty() {
                format!("{program} exited with {}", output.status)
            } else {
                stderr
            })
        }
        Err(e) => ToolOutcome::Failure(format!("failed to wait for {program}: {e}")),
    }
}

// ─── Adapter A: generic judge tool ────────────────────────────────────────────

/// Stage the source at `src_path` into the mailbox for the polling browser
/// extension and launch `cf submit` in the background.
///
/// The judge-view notification fires when the tool reports completion, not
/// when staging happens; a tool error is logged and nothing else.
pub async fn stage_and_submit(ctx: &Arc<AppContext>, src_path: &Path) -> Result<()> {
    let problem = ctx
        .store
        .load(src_path)
        .await?
        .with_context(|| format!("no saved problem for {}", src_path.display()))?;

    let source_code = tokio::fs::read_to_string(src_path)
        .await
        .with_context(|| format!("cannot read source {}", src_path.display()))?;

    let extension = src_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(language_id) = ctx.config.languages.judge_id_for_extension(extension) else {
        bail!("no judge language id configured for extension `{extension}`");
    };

    let problem_name = naming::judge_problem_id(&problem.url);
    ctx.mailbox.store(PendingSubmission {
        url: problem.url.clone(),
        problem_name: problem_name.clone(),
        source_code,
        language_id,
    });
    debug!(problem_name = %problem_name, url = %problem.url, "submission staged");

    let ctx = ctx.clone();
    let src = src_path.to_path_buf();
    tokio::spawn(async move {
        let src = src.to_string_lossy().into_owned();
        match run_tool("cf", &["submit", "-f", &src, &problem_name], None).await {
            ToolOutcome::Success(out) => {
                debug!(output = %out, "cf submit finished");
                ctx.editor.notify(JudgeViewEvent::SubmitFinished);
            }
            ToolOutcome::Failure(err) => debug!("cf submit failed: {err}"),
        }
    });

    Ok(())
}

// ─── Adapter B: Kattis ────────────────────────────────────────────────────────

fn kattis_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let home = std::env::var("USERPROFILE").ok()?;
    #[cfg(not(windows))]
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".kattis"))
}

/// Launch the Kattis submission script for `src_path`.
///
/// Requires `.kattisrc` and `submit.py` under `~/.kattis`; when either is
/// missing the user gets an actionable error and no process is launched. The
/// script asks for confirmation, so a single `Y` is fed to its stdin.
pub async fn submit_kattis(ctx: &Arc<AppContext>, src_path: &Path) -> Result<()> {
    let problem = ctx
        .store
        .load(src_path)
        .await?
        .with_context(|| format!("no saved problem for {}", src_path.display()))?;

    let Some(dir) = kattis_dir() else {
        bail!("cannot determine the home directory");
    };
    let submit_script = dir.join("submit.py");
    if !dir.join(".kattisrc").exists() || !submit_script.exists() {
        ctx.editor.show_error(&format!(
            "Please ensure .kattisrc and submit.py are present in {}",
            dir.display()
        ));
        return Ok(());
    }

    let ctx = ctx.clone();
    let src = src_path.to_string_lossy().into_owned();
    tokio::spawn(async move {
        let script = submit_script.to_string_lossy().into_owned();
        match run_tool("python", &[&script, "-f", &src], Some("Y\n")).await {
            ToolOutcome::Success(out) => {
                if !out.is_empty() {
                    // The script prints the submission url; re-display the
                    // problem as the acknowledgment.
                    ctx.editor.notify(JudgeViewEvent::NewProblem {
                        problem: Some(problem),
                    });
                }
            }
            ToolOutcome::Failure(err) => {
                warn!("kattis submit failed: {err}");
                ctx.editor.show_error(&err);
            }
        }
    });

    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
