pub mod console;
pub mod issue_tracker;
pub mod speech;

pub use console::Console;
pub use issue_tracker::IssueTrackerService;
pub use speech::{SpeechError, SpeechRecognizer, Transcription};
