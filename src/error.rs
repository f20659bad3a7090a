use std::io;

use thiserror::Error;

const PERMISSION_DENIED_MARKER: &str = "You do not have permission";
const UNAUTHORIZED_MARKER: &str = "HTTP 401";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    IssueTracker(#[from] TrackerError),
    #[error("project listing failed: credentials are stale")]
    StaleCredentials,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Message shown to the user right before the process exits.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Configuration(detail) => format!(
                "Settings are missing or invalid ({detail}). Run `voxticket setup` to configure them."
            ),
            AppError::IssueTracker(error) => match error.kind {
                TrackerErrorKind::PermissionDenied => {
                    "The authentication credentials are no longer valid or you do not have \
                     sufficient project permissions."
                        .to_string()
                }
                TrackerErrorKind::Unauthorized => {
                    "Authentication failed. Please configure your credentials.".to_string()
                }
                TrackerErrorKind::Other | TrackerErrorKind::Transport => error.message.clone(),
            },
            AppError::StaleCredentials => {
                "The authentication credentials are no longer valid. Please re-configure them."
                    .to_string()
            }
            AppError::Io(_) => {
                format!("An unexpected error occurred: {self}")
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerErrorKind {
    Unauthorized,
    PermissionDenied,
    Transport,
    Other,
}

/// A failed call to the issue tracker, classified where the response is read.
#[derive(Debug, Clone, Error)]
#[error("{}", describe(.status, .message))]
pub struct TrackerError {
    pub kind: TrackerErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl TrackerError {
    pub fn from_response(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = match status {
            401 => TrackerErrorKind::Unauthorized,
            403 => TrackerErrorKind::PermissionDenied,
            _ => classify_message(&message),
        };
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: TrackerErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: TrackerErrorKind::Other,
            status: None,
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn with_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_message(&message),
            status: None,
            message,
        }
    }
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Jira responded with {status}: {message}"),
        None => format!("Jira request failed: {message}"),
    }
}

fn classify_message(message: &str) -> TrackerErrorKind {
    if message.contains(PERMISSION_DENIED_MARKER) {
        TrackerErrorKind::PermissionDenied
    } else if message.contains(UNAUTHORIZED_MARKER) {
        TrackerErrorKind::Unauthorized
    } else {
        TrackerErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status_first() {
        assert_eq!(
            TrackerError::from_response(401, "nope").kind,
            TrackerErrorKind::Unauthorized
        );
        assert_eq!(
            TrackerError::from_response(403, "nope").kind,
            TrackerErrorKind::PermissionDenied
        );
    }

    #[test]
    fn classifies_known_messages_on_other_statuses() {
        let error = TrackerError::from_response(
            400,
            "You do not have permission to create issues in this project.",
        );
        assert_eq!(error.kind, TrackerErrorKind::PermissionDenied);

        let error = TrackerError::from_response(500, "upstream said HTTP 401");
        assert_eq!(error.kind, TrackerErrorKind::Unauthorized);

        let error = TrackerError::from_response(400, "Field 'priority' is invalid");
        assert_eq!(error.kind, TrackerErrorKind::Other);
    }

    #[test]
    fn unauthorized_message_is_authentication_specific() {
        let error = AppError::from(TrackerError::with_message("HTTP 401: Unauthorized"));
        assert_eq!(
            error.user_message(),
            "Authentication failed. Please configure your credentials."
        );
        assert_ne!(error.exit_code(), 0);
    }

    #[test]
    fn other_tracker_errors_are_verbatim() {
        let error = AppError::from(TrackerError::from_response(400, "Summary is required"));
        assert_eq!(error.user_message(), "Summary is required");
    }

    #[test]
    fn unexpected_errors_are_wrapped_generically() {
        let error = AppError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        assert!(
            error
                .user_message()
                .starts_with("An unexpected error occurred:")
        );
    }

    const PERMISSION_TEXT: &str = "The authentication credentials are no longer valid or you do \
                                   not have sufficient project permissions.";

    #[test]
    fn forbidden_response_explains_permissions() {
        let error = AppError::from(TrackerError::from_response(403, "Forbidden"));
        assert_eq!(error.user_message(), PERMISSION_TEXT);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn permission_message_on_bad_request_explains_permissions() {
        let error = AppError::from(TrackerError::from_response(
            400,
            "You do not have permission to create issues in this project.",
        ));
        assert_eq!(error.user_message(), PERMISSION_TEXT);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn transport_failures_are_verbatim() {
        let error = AppError::from(TrackerError::transport("connection refused"));
        assert_eq!(error.user_message(), "connection refused");
    }

    #[test]
    fn display_includes_status_when_known() {
        assert_eq!(
            TrackerError::from_response(400, "Summary is required").to_string(),
            "Jira responded with 400: Summary is required"
        );
        assert_eq!(
            TrackerError::other("bad body").to_string(),
            "Jira request failed: bad body"
        );
    }
}
