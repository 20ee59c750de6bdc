//! Shared error types for the services crate.

use thiserror::Error;

use navi_core::results::ResultsError;
use navi_core::wizard::WizardError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the HTTP client and API traits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Non-success status. `code` and `message` carry the body's `error`
    /// and `message` fields when present.
    #[error("{}", message.as_deref().unwrap_or("request failed"))]
    Status {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
    /// A 401 outside an auth attempt; credentials have been cleared.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] AuthStoreError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(401),
            ApiError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// The server's `message` field, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The server's `error` field, if it sent one.
    #[must_use]
    pub fn server_code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Server message or the given fallback, for banners.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Errors emitted by `AuthStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored user info is not valid json: {0}")]
    UserInfo(#[from] serde_json::Error),
}

/// Errors emitted by the wizard controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WizardServiceError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `ResultsPresenter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsServiceError {
    #[error("No assessment session found. Please retake the assessment.")]
    MissingSession,
    #[error(transparent)]
    Rejected(#[from] ResultsError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ResultsServiceError {
    /// User-facing explanation, keyed on the HTTP status where there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ResultsServiceError::Api(err) => match err.status() {
                Some(400) => "No assessment responses found for this session. Please complete the assessment.".to_string(),
                Some(401) => "Authentication required. Please log in.".to_string(),
                Some(404) => "Assessment results not found. Please retake the assessment.".to_string(),
                _ => err.user_message("Failed to load your results. Please try again."),
            },
            other => other.to_string(),
        }
    }
}

pub const MSG_RETAKE_FAILED: &str = "Failed to reset assessment. Please try again.";

/// Errors emitted when restarting a finished assessment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetakeError {
    /// The server answered without `success`.
    #[error("Failed to reset assessment. Please try again.")]
    Refused,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RetakeError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RetakeError::Refused => MSG_RETAKE_FAILED.to_string(),
            RetakeError::Api(err) => err.user_message(MSG_RETAKE_FAILED),
        }
    }
}

/// Errors emitted by `AuthFlowService`.
///
/// `Rejected` and `CodeExpired` carry text ready for the form banner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthFlowError {
    /// Form validation failed; nothing was sent.
    #[error("Please fix the highlighted fields.")]
    Invalid(navi_core::auth::FieldErrors),
    #[error("Please enter the complete 5-digit verification code.")]
    IncompleteCode,
    #[error("Please wait {0} seconds before requesting another code.")]
    Cooldown(i64),
    /// The code ran out; a new one can be requested right away.
    #[error("{0}")]
    CodeExpired(String),
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] AuthStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Auth(#[from] AuthStoreError),
    #[error("invalid api base url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
