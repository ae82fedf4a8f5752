// SPDX-License-Identifier: MIT
//! Editor-side collaborators.
//!
//! The judge view, workspace chooser, and message popups all live in the
//! editor extension, not in this daemon. [`bridge::RpcEditorBridge`] exposes
//! them as in-process capabilities: notifications go out as JSON-RPC
//! notification strings over a broadcast channel (delivered to the extension
//! via the SSE route in [`rest`]), and editor-reported state flows back in
//! through the REST routes.

pub mod bridge;
pub mod rest;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::problem::Problem;

// ─── Judge view events ────────────────────────────────────────────────────────

/// Messages the daemon pushes to the judge view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum JudgeViewEvent {
    /// Display a problem, or clear the view when `problem` is absent.
    NewProblem {
        #[serde(skip_serializing_if = "Option::is_none")]
        problem: Option<Problem>,
    },
    /// The staged submission was handed to the browser extension (or the
    /// judge tool reported completion).
    SubmitFinished,
}

// ─── Editor context ───────────────────────────────────────────────────────────

/// Editor state reported by the extension via `POST /api/v1/editor/context`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContext {
    /// First workspace folder, when one is open.
    pub workspace_folder: Option<PathBuf>,
    /// Whether a text editor currently has focus.
    #[serde(default)]
    pub active_editor: bool,
}

// ─── EventBroadcaster ─────────────────────────────────────────────────────────

/// Broadcasts JSON-RPC notification strings to every subscribed editor client.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<String>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Send a JSON-RPC notification to all connected clients.
    pub fn broadcast(&self, method: &str, params: Value) {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        // Ignore errors — no subscribers is fine
        let _ = self
            .tx
            .send(serde_json::to_string(&notification).unwrap_or_default());
    }

    /// Subscribe to all broadcast events.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
