use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    Text(String),
    /// Audio was captured but nothing usable came out of it.
    Unintelligible,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("audio input unavailable: {0}")]
    Device(String),
    #[error("speech recognition service unreachable: {0}")]
    Service(String),
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Samples background noise so the following capture can filter it.
    async fn adjust_for_ambient_noise(&self) -> Result<(), SpeechError>;
    async fn listen(&self) -> Result<Transcription, SpeechError>;
}
