use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "voxticket";
const SETTINGS_FILE_NAME: &str = "settings.json";
const SETTINGS_PATH_ENV: &str = "VOXTICKET_SETTINGS";

pub const DEFAULT_TRANSCRIPTION_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_RECORDER: &str = "sox";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub username: String,
    pub access_token: String,
    pub server_url: String,
    pub known_project_keys: Vec<String>,
    #[serde(default)]
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: Option<String>,
    /// `sox`-compatible recorder, looked up on `PATH` unless absolute.
    pub recorder: String,
    pub calibration_secs: u64,
    pub listen_timeout_secs: u64,
    pub phrase_limit_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRANSCRIPTION_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            language: None,
            recorder: DEFAULT_RECORDER.to_string(),
            calibration_secs: 1,
            listen_timeout_secs: 5,
            phrase_limit_secs: 30,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("username", self.username.as_str()),
            ("access token", self.access_token.as_str()),
            ("server URL", self.server_url.as_str()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{name} is not set")));
            }
        }
        if self.known_project_keys.iter().all(|key| key.trim().is_empty()) {
            return Err(AppError::Configuration(
                "no known project keys are set".to_string(),
            ));
        }
        Ok(())
    }

    /// Trims whitespace, strips the trailing `/` of the server URL and drops
    /// blank project keys.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.access_token = self.access_token.trim().to_string();
        self.server_url = self.server_url.trim().trim_end_matches('/').to_string();
        self.known_project_keys = self
            .known_project_keys
            .into_iter()
            .map(|key| key.trim().to_uppercase())
            .filter(|key| !key.is_empty())
            .collect();
        self
    }
}

/// File-backed settings. `load` must succeed before `get` hands out anything.
pub struct SettingsStore {
    path: PathBuf,
    settings: Option<Settings>,
}

impl SettingsStore {
    pub fn open_default() -> AppResult<Self> {
        Ok(Self::at(settings_file_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> AppResult<&Settings> {
        let settings = self.read()?.ok_or_else(|| {
            AppError::Configuration(format!("no settings found at {}", self.path.display()))
        })?;
        settings.validate()?;
        debug!(path = %self.path.display(), "settings loaded");
        Ok(&*self.settings.insert(settings))
    }

    pub fn get(&self) -> AppResult<&Settings> {
        self.settings
            .as_ref()
            .ok_or_else(|| AppError::Configuration("settings have not been loaded".to_string()))
    }

    /// Reads the file without validating it; `None` when it does not exist yet.
    pub fn read(&self) -> AppResult<Option<Settings>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str::<Settings>(&contents)
                .map(|settings| Some(settings.normalized()))
                .map_err(|err| AppError::Configuration(format!("invalid settings file: {err}"))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&mut self, settings: Settings) -> AppResult<()> {
        let settings = settings.normalized();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&settings)
            .map_err(|err| AppError::Configuration(format!("failed to write settings: {err}")))?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "settings saved");
        self.settings = Some(settings);
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine the configuration directory".to_string())
        })
}

pub fn settings_file_path() -> AppResult<PathBuf> {
    if let Some(path) = env::var_os(SETTINGS_PATH_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(config_directory()?.join(SETTINGS_FILE_NAME))
}
