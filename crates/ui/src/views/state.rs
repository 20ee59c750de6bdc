use dioxus::prelude::*;

use services::{ApiError, ResultsServiceError};

const GENERIC: &str = "Something went wrong. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    SessionExpired,
    /// A message ready to show as-is.
    Message(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ViewError::Unknown => GENERIC,
            ViewError::SessionExpired => "Your session has expired. Please log in again.",
            ViewError::Message(message) => message,
        }
    }

    /// Collapse an API failure, keeping the server's message when it sent one.
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        match err {
            ApiError::SessionExpired => ViewError::SessionExpired,
            other => ViewError::Message(other.user_message(fallback)),
        }
    }
}

impl From<navi_core::Error> for ViewError {
    fn from(err: navi_core::Error) -> Self {
        ViewError::Message(err.to_string())
    }
}

impl From<ResultsServiceError> for ViewError {
    fn from(err: ResultsServiceError) -> Self {
        ViewError::Message(err.user_message())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
