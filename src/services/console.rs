use crate::error::AppResult;

/// Line-oriented terminal access used by every interactive step.
pub trait Console: Send {
    fn say(&mut self, line: &str);
    /// Shows `prompt` and returns the next line without its line ending.
    fn ask(&mut self, prompt: &str) -> AppResult<String>;
}
