use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::{IssueTrackerService, SpeechRecognizer};

#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub speech: Arc<dyn SpeechRecognizer>,
    /// Where the project key listing is written.
    pub scratch_dir: PathBuf,
}

impl AppContext {
    pub fn new(
        settings: Settings,
        issue_tracker: Arc<dyn IssueTrackerService>,
        speech: Arc<dyn SpeechRecognizer>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            settings,
            issue_tracker,
            speech,
            scratch_dir,
        }
    }
}
