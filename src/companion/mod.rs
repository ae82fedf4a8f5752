// SPDX-License-Identifier: MIT
//! Companion listener — the HTTP endpoint the browser extension talks to.
//!
//! One handler for every method and path. Each request is answered with the
//! current mailbox snapshot; a `cph-submit: true` header additionally claims
//! and clears the staged submission, and the request body (when it parses as
//! a problem) is ingested off the response path. See [`crate::mailbox`] for
//! the snapshot-before-clear ordering contract.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    Json, Router,
};
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::editor::JudgeViewEvent;
use crate::mailbox::MailboxEntry;
use crate::problem::Problem;
use crate::AppContext;

/// Header the submission-claiming client sets. Key is matched
/// case-insensitively; the value must be exactly `true`.
pub const SUBMIT_FLAG_HEADER: &str = "cph-submit";

/// Bind and serve the companion listener. A bind failure is reported to the
/// caller, which disables companion functionality without taking down the
/// daemon.
pub async fn start_companion_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.companion_port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_companion_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("companion listener on http://{}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}

/// Method- and path-agnostic: the browser extension POSTs problems and polls
/// wherever it likes, so everything lands in one fallback handler. CORS is
/// wide open — the extension calls from arbitrary judge-site origins.
pub fn build_companion_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .fallback(companion_request)
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

// ─── Request handler ──────────────────────────────────────────────────────────

async fn companion_request(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Body,
) -> Json<MailboxEntry> {
    // Snapshot first: the response always reflects mailbox state at
    // request-start, even when this same request clears the slot below.
    let snapshot = ctx.mailbox.peek();

    let claiming = headers
        .get(SUBMIT_FLAG_HEADER)
        .and_then(|v| v.to_str().ok())
        == Some("true");
    if claiming {
        let taken = ctx.mailbox.take_if_submit_flag(true);
        if !taken.is_empty() {
            debug!("staged submission claimed by the browser extension");
            ctx.editor.notify(JudgeViewEvent::SubmitFinished);
        }
    }

    // Ingestion must not block the response; the body may still be streaming.
    let ingest_ctx = ctx.clone();
    tokio::spawn(async move {
        ingest_request_body(ingest_ctx, body).await;
    });

    Json(snapshot)
}

/// Accumulate the request body chunk-by-chunk, then parse and ingest it.
/// Anything that is not a problem payload is dropped silently — polls have
/// empty bodies, and the payload producer is an automated extension, not a
/// user to interrupt.
async fn ingest_request_body(ctx: Arc<AppContext>, body: Body) {
    let mut stream = body.into_data_stream();
    let mut raw: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => raw.extend_from_slice(&bytes),
            Err(e) => {
                debug!("companion request body aborted: {e}");
                return;
            }
        }
    }
    if raw.is_empty() {
        return;
    }

    let problem: Problem = match serde_json::from_slice(&raw) {
        Ok(problem) => problem,
        Err(e) => {
            debug!("companion body is not a problem payload: {e}");
            return;
        }
    };

    debug!(name = %problem.name, url = %problem.url, "problem received");
    match crate::ingest::handle_new_problem(&ctx, problem).await {
        Ok(()) => {}
        // Abort paths already spoke to the user (or chose not to); record only.
        Err(e @ crate::ingest::IngestAbort::Io(_)) => warn!("ingestion failed: {e}"),
        Err(e) => debug!("ingestion aborted: {e}"),
    }
}
