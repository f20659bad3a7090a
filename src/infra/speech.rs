use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::SpeechSettings;
use crate::services::{SpeechError, SpeechRecognizer, Transcription};

const SAMPLE_RATE: &str = "16000";
/// A canonical PCM WAV header; anything beyond it means sound got past the silence gate.
const WAV_HEADER_LEN: u64 = 44;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PROCESS_GRACE: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const NOISE_REDUCTION: &str = "0.21";
const SILENCE_THRESHOLD: &str = "1%";

/// Records from the default input device through the `sox` binary.
pub struct SoxRecorder {
    program: String,
    work_dir: PathBuf,
    calibration: Duration,
    listen_timeout: Duration,
    phrase_limit: Duration,
}

impl SoxRecorder {
    pub fn new(work_dir: PathBuf, settings: &SpeechSettings) -> Self {
        Self {
            program: settings.recorder.clone(),
            work_dir,
            calibration: Duration::from_secs(settings.calibration_secs.max(1)),
            listen_timeout: Duration::from_secs(settings.listen_timeout_secs.max(1)),
            phrase_limit: Duration::from_secs(settings.phrase_limit_secs.max(1)),
        }
    }

    fn noise_profile(&self) -> PathBuf {
        self.work_dir.join("noise.prof")
    }

    fn start_failed(&self, err: std::io::Error) -> SpeechError {
        SpeechError::Device(format!("failed to start {}: {err}", self.program))
    }

    async fn prepare_work_dir(&self) -> Result<(), SpeechError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|err| SpeechError::Device(format!("cannot prepare audio directory: {err}")))
    }

    pub async fn calibrate(&self) -> Result<(), SpeechError> {
        self.prepare_work_dir().await?;

        let mut command = Command::new(&self.program);
        command
            .args(["-q", "-d", "-n", "trim", "0"])
            .arg(self.calibration.as_secs().to_string())
            .arg("noiseprof")
            .arg(self.noise_profile())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.calibration + PROCESS_GRACE, command.output())
            .await
            .map_err(|_| SpeechError::Device("noise calibration timed out".to_string()))?
            .map_err(|err| self.start_failed(err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Device(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        debug!(profile = %self.noise_profile().display(), "ambient noise profile recorded");
        Ok(())
    }

    /// Returns `None` when nobody spoke within the listen timeout.
    pub async fn capture(&self) -> Result<Option<Vec<u8>>, SpeechError> {
        self.prepare_work_dir().await?;
        let clip = self.work_dir.join("clip.wav");
        let _ = tokio::fs::remove_file(&clip).await;

        let mut child = Command::new(&self.program)
            .args(["-q", "-d", "-c", "1", "-r", SAMPLE_RATE, "-b", "16"])
            .arg(&clip)
            .args(["silence", "1", "0.1", SILENCE_THRESHOLD, "1", "1.5", SILENCE_THRESHOLD])
            .args(["trim", "0"])
            .arg(self.phrase_limit.as_secs().to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| self.start_failed(err))?;

        let started = Instant::now();
        let hard_limit = self.listen_timeout + self.phrase_limit + PROCESS_GRACE;
        loop {
            let exited = child
                .try_wait()
                .map_err(|err| SpeechError::Device(format!("lost the recorder process: {err}")))?;
            if let Some(status) = exited {
                if !status.success() {
                    return Err(SpeechError::Device(format!(
                        "{} exited with {status}",
                        self.program
                    )));
                }
                break;
            }

            let elapsed = started.elapsed();
            if elapsed >= self.listen_timeout && !speech_started(&clip).await {
                let _ = child.kill().await;
                debug!(timeout = ?self.listen_timeout, "no speech before listen timeout");
                return Ok(None);
            }
            if elapsed >= hard_limit {
                let _ = child.kill().await;
                warn!("recorder did not stop on its own; using what was captured");
                break;
            }
            sleep(POLL_INTERVAL).await;
        }

        if !speech_started(&clip).await {
            return Ok(None);
        }
        let audio_path = self.denoise(&clip).await;
        tokio::fs::read(&audio_path)
            .await
            .map(Some)
            .map_err(|err| SpeechError::Device(format!("cannot read captured audio: {err}")))
    }

    async fn denoise(&self, clip: &Path) -> PathBuf {
        let cleaned = self.work_dir.join("clip.clean.wav");
        let result = Command::new(&self.program)
            .arg("-q")
            .arg(clip)
            .arg(&cleaned)
            .arg("noisered")
            .arg(self.noise_profile())
            .arg(NOISE_REDUCTION)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) if status.success() => cleaned,
            Ok(status) => {
                warn!(%status, "noise reduction failed; sending raw audio");
                clip.to_path_buf()
            }
            Err(err) => {
                warn!(error = %err, "noise reduction failed; sending raw audio");
                clip.to_path_buf()
            }
        }
    }
}

async fn speech_started(clip: &Path) -> bool {
    tokio::fs::metadata(clip)
        .await
        .map(|meta| meta.len() > WAV_HEADER_LEN)
        .unwrap_or(false)
}

/// Client for an OpenAI-compatible `audio/transcriptions` endpoint.
pub struct TranscriptionClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    language: Option<String>,
}

impl TranscriptionClient {
    pub fn new(settings: &SpeechSettings) -> Self {
        Self {
            http: Client::new(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: settings.model.clone(),
            language: settings.language.clone().filter(|lang| !lang.trim().is_empty()),
        }
    }

    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<Transcription, SpeechError> {
        let file = Part::bytes(audio)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|err| SpeechError::Service(err.to_string()))?;
        let mut form = Form::new().part("file", file).text("model", self.model.clone());
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let mut request = self
            .http
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SpeechError::Service(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body.trim(), "transcription rejected the audio");
            return Ok(Transcription::Unintelligible);
        }
        if !status.is_success() {
            return Err(SpeechError::Service(format!(
                "transcription service responded with {status}"
            )));
        }

        let payload: TranscriptionResponse = response
            .json()
            .await
            .map_err(|err| SpeechError::Service(format!("unreadable transcription: {err}")))?;
        let text = payload.text.trim();
        if text.is_empty() {
            Ok(Transcription::Unintelligible)
        } else {
            Ok(Transcription::Text(text.to_string()))
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct VoiceRecognizer {
    recorder: SoxRecorder,
    transcriber: TranscriptionClient,
}

impl VoiceRecognizer {
    pub fn new(work_dir: PathBuf, settings: &SpeechSettings) -> Self {
        Self {
            recorder: SoxRecorder::new(work_dir, settings),
            transcriber: TranscriptionClient::new(settings),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for VoiceRecognizer {
    async fn adjust_for_ambient_noise(&self) -> Result<(), SpeechError> {
        self.recorder.calibrate().await
    }

    async fn listen(&self) -> Result<Transcription, SpeechError> {
        match self.recorder.capture().await? {
            Some(audio) => self.transcriber.transcribe(audio).await,
            None => Ok(Transcription::Unintelligible),
        }
    }
}
