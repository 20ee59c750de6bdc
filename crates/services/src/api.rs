//! Remote API contracts.
//!
//! The wizard, results and auth services depend on these traits rather than
//! on `ApiClient` directly, so tests can swap in in-memory fakes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use navi_core::auth::AuthUser;
use navi_core::model::{
    CareerId, ProgressDetails, ProgressSnapshot, Question, QuestionId, ResponseValue, SessionId,
};
use navi_core::wizard::{DraftSnapshot, Submission, WizardStage};

use crate::error::ApiError;

/// `GET /api/questions/initial` and `GET /api/questions/objective`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub session_id: SessionId,
}

/// `GET /api/questions/progress`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    #[serde(default)]
    pub has_progress: bool,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub progress: Option<ProgressDetails>,
}

impl ProgressResponse {
    /// Whether a personal-stage draft is waiting on the server.
    #[must_use]
    pub fn has_personal_draft(&self) -> bool {
        self.has_progress && self.current_step.as_deref() == Some("personal-questions")
    }
}

/// `GET /api/questions/resume`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    #[serde(default)]
    pub progress: ProgressSnapshot,
    #[serde(default)]
    pub redirect_to: Option<String>,
    #[serde(default)]
    pub session_id: SessionId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub personal_questions: Option<Vec<Question>>,
    #[serde(default)]
    pub personal_responses: Option<BTreeMap<QuestionId, ResponseValue>>,
    #[serde(default)]
    pub total_objective_questions: Option<u64>,
}

impl ResumeResponse {
    /// The saved personal draft, when the server sent both halves of it.
    #[must_use]
    pub fn into_personal_draft(
        self,
    ) -> Option<(Vec<Question>, BTreeMap<QuestionId, ResponseValue>, SessionId)> {
        match (self.personal_questions, self.personal_responses) {
            (Some(questions), Some(responses)) => Some((questions, responses, self.session_id)),
            _ => None,
        }
    }
}

/// `POST /api/questions/personal`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalSubmitResponse {
    #[serde(default)]
    pub objective_questions: Vec<Question>,
    #[serde(default)]
    pub session_id: SessionId,
}

/// `POST /api/questions/objective`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSubmitResponse {
    #[serde(default)]
    pub session_id: SessionId,
}

/// The `{success, message}` envelope most auth endpoints answer with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Question fetch, draft and submission endpoints.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn resume(&self) -> Result<ResumeResponse, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn progress(&self) -> Result<ProgressResponse, ApiError>;

    /// Delete the saved personal draft.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn clear_progress(&self) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn stage_questions(&self, stage: WizardStage) -> Result<QuestionSet, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn save_progress(&self, draft: &DraftSnapshot) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn submit_personal(
        &self,
        submission: &Submission,
    ) -> Result<PersonalSubmitResponse, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn submit_objective(
        &self,
        submission: &Submission,
    ) -> Result<ObjectiveSubmitResponse, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn retake(&self) -> Result<Acknowledgement, ApiError>;
}

/// Recommendation and advice endpoints. Payloads come back raw; shape
/// handling lives in `navi_core::results`.
#[async_trait]
pub trait CareerApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn recommendations(&self, session_id: &SessionId) -> Result<Value, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn advice(&self, career_id: &CareerId) -> Result<Value, ApiError>;
}

/// Account endpoints. Emails are expected already normalized.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn verify_email(&self, email: &str, code: &str) -> Result<Acknowledgement, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn resend_verification(&self, email: &str) -> Result<Acknowledgement, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn forgot_password(&self, email: &str) -> Result<Acknowledgement, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn reset_password(&self, token: &str, password: &str)
    -> Result<Acknowledgement, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn profile(&self) -> Result<ProfileResponse, ApiError>;
}
