pub mod companion;
pub mod config;
pub mod editor;
pub mod ingest;
pub mod mailbox;
pub mod problem;
pub mod submit;

use std::sync::Arc;

use config::CompanionConfig;
use editor::bridge::RpcEditorBridge;
use editor::EventBroadcaster;
use mailbox::SubmitMailbox;
use problem::store::ProblemStore;

/// Shared application state passed to every request handler and background task.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<CompanionConfig>,
    /// Single-slot submission hand-off to the browser extension.
    pub mailbox: Arc<SubmitMailbox>,
    /// Bridge to the connected editor extension (judge view, popups, quick-picks).
    pub editor: Arc<RpcEditorBridge>,
    /// Sidecar metadata store for generated sources.
    pub store: Arc<ProblemStore>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: CompanionConfig) -> Arc<Self> {
        let broadcaster = EventBroadcaster::new();
        Arc::new(Self {
            config: Arc::new(config),
            mailbox: Arc::new(SubmitMailbox::new()),
            editor: Arc::new(RpcEditorBridge::new(broadcaster)),
            store: Arc::new(ProblemStore::new()),
            started_at: std::time::Instant::now(),
        })
    }
}
