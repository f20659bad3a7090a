use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::project::ProjectSummary;
use crate::domain::ticket::{Ticket, TicketDraft};
use crate::domain::user::RemoteUser;
use crate::error::{AppResult, TrackerError};
use crate::services::{Console, IssueTrackerService, SpeechError, SpeechRecognizer, Transcription};

#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|line| line.to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }

    pub fn count_printed(&self, needle: &str) -> usize {
        self.transcript.iter().filter(|line| line.contains(needle)).count()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> AppResult<String> {
        self.transcript.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted").into())
    }
}

#[derive(Default)]
pub struct FakeTracker {
    users: Vec<(String, RemoteUser)>,
    projects: Option<Vec<ProjectSummary>>,
    search_error: Option<TrackerError>,
    create_error: Option<TrackerError>,
    assign_error: Option<TrackerError>,
    pub created: Mutex<Vec<TicketDraft>>,
    pub assigned: Mutex<Vec<(String, RemoteUser)>>,
}

impl FakeTracker {
    /// Every product owner resolvable, plus the configured user `jane`.
    pub fn with_all_owners() -> Self {
        crate::domain::owners::PRODUCT_OWNERS
            .iter()
            .enumerate()
            .fold(Self::default(), |tracker, (index, name)| {
                tracker.with_user(name, RemoteUser::new(format!("acc-{index}"), *name))
            })
            .with_user("jane@example.com", RemoteUser::new("acc-jane", "Jane Doe"))
    }

    pub fn with_user(mut self, query: &str, user: RemoteUser) -> Self {
        self.users.push((query.to_string(), user));
        self
    }

    pub fn with_projects(mut self, projects: Vec<ProjectSummary>) -> Self {
        self.projects = Some(projects);
        self
    }

    pub fn failing_search(mut self, error: TrackerError) -> Self {
        self.search_error = Some(error);
        self
    }

    pub fn failing_create(mut self, error: TrackerError) -> Self {
        self.create_error = Some(error);
        self
    }

    pub fn failing_assign(mut self, error: TrackerError) -> Self {
        self.assign_error = Some(error);
        self
    }

    pub fn created_drafts(&self) -> Vec<TicketDraft> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn search_users(&self, query: &str, max_results: u32) -> AppResult<Vec<RemoteUser>> {
        if let Some(error) = &self.search_error {
            return Err(error.clone().into());
        }
        Ok(self
            .users
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(query))
            .map(|(_, user)| user.clone())
            .take(max_results as usize)
            .collect())
    }

    async fn list_projects(&self) -> AppResult<Vec<ProjectSummary>> {
        self.projects
            .clone()
            .ok_or_else(|| TrackerError::from_response(401, "Unauthorized").into())
    }

    async fn create_ticket(&self, draft: &TicketDraft) -> AppResult<Ticket> {
        if let Some(error) = &self.create_error {
            return Err(error.clone().into());
        }
        let mut created = self.created.lock().unwrap();
        created.push(draft.clone());
        let key = format!("{}-{}", draft.project_key, created.len());
        Ok(Ticket {
            url: format!("https://example.atlassian.net/browse/{key}"),
            key,
        })
    }

    async fn assign_ticket(&self, ticket_key: &str, assignee: &RemoteUser) -> AppResult<()> {
        if let Some(error) = &self.assign_error {
            return Err(error.clone().into());
        }
        self.assigned
            .lock()
            .unwrap()
            .push((ticket_key.to_string(), assignee.clone()));
        Ok(())
    }
}

pub struct ScriptedRecognizer {
    outcomes: Mutex<VecDeque<Result<Transcription, SpeechError>>>,
    calibration_error: Option<SpeechError>,
}

impl ScriptedRecognizer {
    pub fn new(outcomes: Vec<Result<Transcription, SpeechError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calibration_error: None,
        }
    }

    pub fn heard(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|text| Ok(Transcription::Text(text.to_string())))
                .collect(),
        )
    }

    pub fn without_microphone() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calibration_error: Some(SpeechError::Device("no input device".to_string())),
        }
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn adjust_for_ambient_noise(&self) -> Result<(), SpeechError> {
        match &self.calibration_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn listen(&self) -> Result<Transcription, SpeechError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SpeechError::Service("script exhausted".to_string())))
    }
}
