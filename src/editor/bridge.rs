// SPDX-License-Identifier: MIT
//! In-memory bridge to the connected editor extension.

use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::{EditorContext, EventBroadcaster, JudgeViewEvent};

// ─── RpcEditorBridge ──────────────────────────────────────────────────────────

/// Shared, in-memory state for the connected editor extension.
///
/// Outbound: judge-view events, message popups, quick-pick requests, all as
/// JSON-RPC notifications on the broadcast channel. Inbound: the extension
/// reports its [`EditorContext`] and answers quick-picks over REST.
pub struct RpcEditorBridge {
    broadcaster: EventBroadcaster,
    context: RwLock<EditorContext>,
    /// Quick-pick answers waiting for the editor, keyed by request id.
    pending_choices: StdMutex<HashMap<String, oneshot::Sender<Option<String>>>>,
}

impl RpcEditorBridge {
    pub fn new(broadcaster: EventBroadcaster) -> Self {
        Self {
            broadcaster,
            context: RwLock::new(EditorContext::default()),
            pending_choices: StdMutex::new(HashMap::new()),
        }
    }

    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.broadcaster
    }

    // ── Outbound capabilities ─────────────────────────────────────────────────

    /// Push an event to the judge view. Fire-and-forget.
    pub fn notify(&self, event: JudgeViewEvent) {
        let params = serde_json::to_value(&event).unwrap_or_default();
        self.broadcaster.broadcast("judgeView.notify", params);
    }

    pub fn show_info(&self, message: &str) {
        self.broadcaster
            .broadcast("window.showInformationMessage", json!({ "message": message }));
    }

    pub fn show_error(&self, message: &str) {
        self.broadcaster
            .broadcast("window.showErrorMessage", json!({ "message": message }));
    }

    /// Ask the editor to open and focus a source document.
    pub fn open_source(&self, path: &Path) {
        self.broadcaster
            .broadcast("editor.openSource", json!({ "path": path }));
    }

    /// Present a quick-pick and wait for the editor's answer. Returns `None`
    /// when the user cancels or the editor disconnects. Waits indefinitely —
    /// the caller is an interactive flow with no timeout story.
    pub async fn choose_one(&self, options: &[String]) -> Option<String> {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending_choices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.clone(), tx);

        self.broadcaster
            .broadcast("editor.quickPick", json!({ "id": id, "options": options }));
        debug!(id = %id, "quick-pick requested");

        rx.await.unwrap_or(None)
    }

    // ── Inbound (REST route backends) ─────────────────────────────────────────

    /// Record the editor context reported by the extension.
    pub async fn update_context(&self, ctx: EditorContext) {
        let mut guard = self.context.write().await;
        if guard.workspace_folder != ctx.workspace_folder {
            info!(folder = ?ctx.workspace_folder, "workspace folder changed");
        }
        *guard = ctx;
    }

    /// Resolve a pending quick-pick. Returns `false` for an unknown id
    /// (already answered, or never issued).
    pub fn resolve_choice(&self, id: &str, selected: Option<String>) -> bool {
        let tx = self
            .pending_choices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(id);
        match tx {
            Some(tx) => tx.send(selected).is_ok(),
            None => false,
        }
    }

    pub async fn workspace_folder(&self) -> Option<PathBuf> {
        self.context.read().await.workspace_folder.clone()
    }

    pub async fn has_active_editor(&self) -> bool {
        self.context.read().await.active_editor
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> RpcEditorBridge {
        RpcEditorBridge::new(EventBroadcaster::new())
    }

    #[tokio::test]
    async fn context_defaults_to_no_workspace_and_no_editor() {
        let b = bridge();
        assert!(b.workspace_folder().await.is_none());
        assert!(!b.has_active_editor().await);
    }

    #[tokio::test]
    async fn update_context_is_visible_to_readers() {
        let b = bridge();
        b.update_context(EditorContext {
            workspace_folder: Some(PathBuf::from("/ws")),
            active_editor: true,
        })
        .await;
        assert_eq!(b.workspace_folder().await, Some(PathBuf::from("/ws")));
        assert!(b.has_active_editor().await);
    }

    #[tokio::test]
    async fn notify_reaches_subscribers_as_json_rpc() {
        let b = bridge();
        let mut rx = b.broadcaster().subscribe();
        b.notify(JudgeViewEvent::SubmitFinished);
        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["method"], "judgeView.notify");
        assert_eq!(v["params"]["command"], "submit-finished");
    }

    #[tokio::test]
    async fn choose_one_resolves_with_editor_answer() {
        let b = std::sync::Arc::new(bridge());
        let mut rx = b.broadcaster().subscribe();

        let chooser = {
            let b = b.clone();
            tokio::spawn(async move {
                b.choose_one(&["cpp".to_string(), "python".to_string()]).await
            })
        };

        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["method"], "editor.quickPick");
        let id = v["params"]["id"].as_str().unwrap();

        assert!(b.resolve_choice(id, Some("python".to_string())));
        assert_eq!(chooser.await.unwrap().as_deref(), Some("python"));
    }

    #[tokio::test]
    async fn cancelled_choice_yields_none() {
        let b = std::sync::Arc::new(bridge());
        let mut rx = b.broadcaster().subscribe();
        let chooser = {
            let b = b.clone();
            tokio::spawn(async move { b.choose_one(&["cpp".to_string()]).await })
        };
        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let id = v["params"]["id"].as_str().unwrap();

        assert!(b.resolve_choice(id, None));
        assert_eq!(chooser.await.unwrap(), None);
    }

    #[test]
    fn unknown_choice_id_is_rejected() {
        assert!(!bridge().resolve_choice("nope", Some("cpp".to_string())));
    }
}
