// SPDX-License-Identifier: MIT
//! Problem ingestion — turns a pushed problem payload into a source file,
//! sidecar metadata, and a judge-view notification.
//!
//! Single pass, no retries. Aborts are terminal and reported through
//! [`IngestAbort`]; user-facing aborts show a message through the editor
//! bridge before returning, malformed input aborts only log.

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::problem::{naming, Problem};
use crate::AppContext;

// ─── Abort reasons ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum IngestAbort {
    #[error("no workspace folder is open")]
    NoWorkspace,
    #[error("language selection cancelled")]
    SelectionCancelled,
    #[error("default language `{0}` has no configured extension")]
    UnknownLanguage(String),
    #[error("malformed problem url `{url}`: {source}")]
    MalformedUrl {
        url: String,
        source: url::ParseError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

/// Handle a problem pushed by the browser extension: create the source file,
/// persist the sidecar, and hand the populated problem to the judge view.
pub async fn handle_new_problem(
    ctx: &AppContext,
    mut problem: Problem,
) -> Result<(), IngestAbort> {
    // If the judge view may be focused, clear it first to prevent a layout bug.
    if !ctx.editor.has_active_editor().await {
        ctx.editor
            .notify(crate::editor::JudgeViewEvent::NewProblem { problem: None });
    }

    let Some(folder) = ctx.editor.workspace_folder().await else {
        ctx.editor.show_info("Please open a folder first.");
        return Err(IngestAbort::NoWorkspace);
    };

    let extension = resolve_extension(ctx).await?;

    let url = match Url::parse(&problem.url) {
        Ok(url) => url,
        Err(source) => {
            debug!(url = %problem.url, error = %source, "ignoring problem with malformed url");
            return Err(IngestAbort::MalformedUrl {
                url: problem.url.clone(),
                source,
            });
        }
    };

    // Kattis titles are not self-descriptive; use the url slug instead.
    if naming::is_kattis_url(&url) {
        problem.name = naming::short_problem_name(&url);
    }

    let file_name = naming::resolve_file_name(
        &problem.name,
        &url,
        &extension,
        ctx.config.short_codeforces_names,
    );
    let src_path = folder.join(&file_name);
    problem.src_path = Some(src_path.clone());
    problem.assign_test_ids();

    if !tokio::fs::try_exists(&src_path).await.unwrap_or(false) {
        tokio::fs::write(&src_path, "").await?;
    }

    if let Err(e) = ctx.store.save(&src_path, &problem).await {
        // Sidecar is best-effort; the source file is already in place.
        warn!(path = %src_path.display(), "failed to save problem sidecar: {e:#}");
    }

    let mut wrote_header = false;
    if ctx.config.header_comments {
        let tok = comment_token(&extension);
        let header = format!(
            "{tok} Problem : {}\n{tok} url : {}\n{tok} Group : {}\n{tok} Memory Limit : {}\n{tok} Time Limit : {}\n\n",
            problem.name, problem.url, problem.group, problem.memory_limit, problem.time_limit,
        );
        tokio::fs::write(&src_path, header).await?;
        wrote_header = true;
    }

    if ctx.config.languages.default_language.is_some() {
        if let Some(template) = &ctx.config.languages.template_file {
            if !tokio::fs::try_exists(template).await.unwrap_or(false) {
                ctx.editor.show_error(&format!(
                    "Template file does not exist: {}",
                    template.display()
                ));
            } else {
                let contents = tokio::fs::read(template).await?;
                if wrote_header {
                    let mut file = tokio::fs::OpenOptions::new()
                        .append(true)
                        .open(&src_path)
                        .await?;
                    file.write_all(&contents).await?;
                    file.flush().await?;
                } else {
                    tokio::fs::write(&src_path, contents).await?;
                }
            }
        }
    }

    ctx.editor.open_source(&src_path);
    ctx.editor
        .notify(crate::editor::JudgeViewEvent::NewProblem {
            problem: Some(problem),
        });
    Ok(())
}

/// Target extension: the default language's, or the user's quick-pick choice.
async fn resolve_extension(ctx: &AppContext) -> Result<String, IngestAbort> {
    let langs = &ctx.config.languages;

    if let Some(language) = &langs.default_language {
        return match langs.extension_for(language) {
            Some(ext) => Ok(ext.to_string()),
            None => {
                ctx.editor
                    .show_error(&format!("Unknown default language: {language}"));
                Err(IngestAbort::UnknownLanguage(language.clone()))
            }
        };
    }

    // Menu entries the extension map doesn't know are dropped from the pick.
    let choices: Vec<String> = langs
        .menu_choices
        .iter()
        .filter(|c| langs.extensions.contains_key(*c))
        .cloned()
        .collect();

    match ctx.editor.choose_one(&choices).await {
        Some(language) => langs
            .extension_for(&language)
            .map(str::to_string)
            .ok_or_else(|| IngestAbort::UnknownLanguage(language)),
        None => {
            ctx.editor.show_info("Aborted creation of new file");
            Err(IngestAbort::SelectionCancelled)
        }
    }
}

fn comment_token(extension: &str) -> &'static str {
    if extension == "py" {
        "#"
    } else {
        "//"
    }
}
