use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::agents::Pipeline;
use crate::domain::conversation::ConversationState;
use crate::domain::relay::ChatRelay;
use crate::infrastructure::github::RepoScanner;

/// Shared application state
///
/// The conversation mutex is held for a whole chat request, so requests
/// are applied one at a time.
pub struct AppState {
    pub conversation: Mutex<ConversationState>,
    pub pipeline: Arc<dyn Pipeline>,
    pub relay: Arc<dyn ChatRelay>,
    pub scanner: RepoScanner,
    pub project_folder: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        pipeline: Arc<dyn Pipeline>,
        relay: Arc<dyn ChatRelay>,
        scanner: RepoScanner,
        project_folder: PathBuf,
    ) -> SharedState {
        Arc::new(Self {
            conversation: Mutex::new(ConversationState::new()),
            pipeline,
            relay,
            scanner,
            project_folder,
        })
    }
}
