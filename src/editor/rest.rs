// editor/rest.rs — REST surface for the editor extension.
//
// Axum HTTP server, loopback only.
//
// Endpoints:
//   GET  /api/v1/health
//   GET  /api/v1/events           (SSE — JSON-RPC notifications)
//   POST /api/v1/editor/context   (workspace folder + focus report)
//   POST /api/v1/editor/choice    (quick-pick answer)
//   POST /api/v1/submit           (stage source for the browser extension + judge tool)
//   POST /api/v1/submit/kattis    (launch the Kattis submission tool)

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::EditorContext;
use crate::{submit, AppContext};

pub async fn start_editor_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.editor_port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_editor_router(ctx);

    info!("editor API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_editor_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/events", get(events_sse))
        .route("/api/v1/editor/context", post(update_context))
        .route("/api/v1/editor/choice", post(answer_choice))
        .route("/api/v1/submit", post(stage_submission))
        .route("/api/v1/submit/kattis", post(kattis_submission))
        .with_state(ctx)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    Json(json!({
        "status": "ok",
        "uptime_secs": uptime,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Forward every broadcast JSON-RPC notification to the editor as SSE.
async fn events_sse(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let rx = ctx.editor.broadcaster().subscribe();

    let s = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let method = serde_json::from_str::<Value>(&notification)
                        .ok()
                        .and_then(|v| v.get("method").and_then(Value::as_str).map(str::to_string))
                        .unwrap_or_else(|| "event".to_string());
                    let sse_event = Event::default().data(notification).event(method);
                    return Some((Ok::<Event, std::convert::Infallible>(sse_event), rx));
                }
                // Dropped behind — skip to live events.
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(s).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn update_context(
    State(ctx): State<Arc<AppContext>>,
    Json(report): Json<EditorContext>,
) -> StatusCode {
    ctx.editor.update_context(report).await;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct ChoiceAnswer {
    id: String,
    /// Absent on cancel.
    selected: Option<String>,
}

async fn answer_choice(
    State(ctx): State<Arc<AppContext>>,
    Json(answer): Json<ChoiceAnswer>,
) -> impl IntoResponse {
    if ctx.editor.resolve_choice(&answer.id, answer.selected) {
        (StatusCode::OK, Json(json!({ "resolved": true })))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "resolved": false })))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    src_path: PathBuf,
}

async fn stage_submission(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    match submit::stage_and_submit(&ctx, &req.src_path).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "staged": true }))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "staged": false, "error": e.to_string() })),
        ),
    }
}

async fn kattis_submission(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    match submit::submit_kattis(&ctx, &req.src_path).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "launched": true }))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "launched": false, "error": e.to_string() })),
        ),
    }
}
