//! The assessment landing screen: where the user is, what comes next.

use std::sync::Arc;

use navi_core::model::{ProgressDetails, ProgressSnapshot, RedirectTarget, SessionId, Stage};
use navi_core::wizard::WizardStage;

use crate::api::{AssessmentApi, ResumeResponse};
use crate::error::{ApiError, RetakeError};
use crate::flow::FlowRoute;

pub const MSG_HOME_LOAD_FAILED: &str = "Failed to load your progress";
pub const MSG_RETAKE_OK: &str = "Assessment reset successfully!";
pub const LOADING_LABEL: &str = "Loading...";
pub const PERSONAL_QUESTION_COUNT: u64 = 10;
pub const DEFAULT_OBJECTIVE_QUESTION_COUNT: u64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
    Locked,
}

impl StepStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Completed => "completed",
            StepStatus::Current => "current",
            StepStatus::Upcoming => "upcoming",
            StepStatus::Locked => "locked",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    PersonalDiscovery,
    DynamicAssessment,
    CareerInsights,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [
        StepKind::PersonalDiscovery,
        StepKind::DynamicAssessment,
        StepKind::CareerInsights,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            StepKind::PersonalDiscovery => "Personal Discovery",
            StepKind::DynamicAssessment => "Dynamic Assessment",
            StepKind::CareerInsights => "Career Insights",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            StepKind::PersonalDiscovery => "Share your interests, values, and aspirations with us",
            StepKind::DynamicAssessment => "AI-generated questions tailored to your responses",
            StepKind::CareerInsights => {
                "Receive personalized career recommendations and guidance"
            }
        }
    }

    #[must_use]
    pub fn estimated(self) -> &'static str {
        match self {
            StepKind::PersonalDiscovery => "5-7 minutes",
            StepKind::DynamicAssessment => "10-15 minutes",
            StepKind::CareerInsights => "2-3 minutes",
        }
    }
}

/// One card in the three-step overview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentStep {
    pub kind: StepKind,
    pub status: StepStatus,
    /// `(answered, total)`; the insights step has no questions.
    pub counts: Option<(u64, u64)>,
}

/// Server progress interpreted for the home screen.
#[derive(Clone, Debug, PartialEq)]
pub struct AssessmentOverview {
    progress: ProgressSnapshot,
    redirect: RedirectTarget,
    session_id: SessionId,
    message: Option<String>,
    total_objective_questions: Option<u64>,
}

impl AssessmentOverview {
    #[must_use]
    pub fn from_resume(resume: ResumeResponse) -> Self {
        Self {
            redirect: RedirectTarget::parse(resume.redirect_to.as_deref()),
            progress: resume.progress,
            session_id: resume.session_id,
            message: resume.message.filter(|message| !message.trim().is_empty()),
            total_objective_questions: resume.total_objective_questions,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.progress.stage()
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressSnapshot {
        &self.progress
    }

    #[must_use]
    pub fn redirect(&self) -> &RedirectTarget {
        &self.redirect
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Server greeting such as "Welcome back!".
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn step_status(&self, kind: StepKind) -> StepStatus {
        let stage = self.stage();
        if stage == Stage::Completed {
            return StepStatus::Completed;
        }
        let personal_done = self.progress.personal_completed.is_set();
        let objective_done = self.progress.objective_completed.is_set();

        match kind {
            StepKind::PersonalDiscovery => match stage {
                _ if personal_done => StepStatus::Completed,
                Stage::Initial => StepStatus::Upcoming,
                Stage::Personal => StepStatus::Current,
                _ => StepStatus::Completed,
            },
            StepKind::DynamicAssessment => match stage {
                _ if objective_done => StepStatus::Completed,
                _ if personal_done => StepStatus::Current,
                Stage::Initial | Stage::Personal => StepStatus::Upcoming,
                Stage::Objective => StepStatus::Current,
                Stage::Completed => StepStatus::Locked,
            },
            StepKind::CareerInsights => StepStatus::Locked,
        }
    }

    /// Answered/total for the personal stage. A bare completion flag counts
    /// as all ten answered.
    #[must_use]
    pub fn personal_counts(&self) -> (u64, u64) {
        let answered = self
            .detail(|details| details.personal_completed)
            .unwrap_or(if self.progress.personal_completed.is_set() {
                PERSONAL_QUESTION_COUNT
            } else {
                0
            });
        (answered, PERSONAL_QUESTION_COUNT)
    }

    #[must_use]
    pub fn objective_counts(&self) -> (u64, u64) {
        let total = self
            .total_objective_questions
            .filter(|total| *total > 0);
        let answered = self
            .detail(|details| details.objective_completed)
            .unwrap_or(if self.progress.objective_completed.is_set() {
                total.unwrap_or(0)
            } else {
                0
            });
        (answered, total.unwrap_or(DEFAULT_OBJECTIVE_QUESTION_COUNT))
    }

    #[must_use]
    pub fn steps(&self) -> [AssessmentStep; 3] {
        StepKind::ALL.map(|kind| AssessmentStep {
            kind,
            status: self.step_status(kind),
            counts: match kind {
                StepKind::PersonalDiscovery => Some(self.personal_counts()),
                StepKind::DynamicAssessment => Some(self.objective_counts()),
                StepKind::CareerInsights => None,
            },
        })
    }

    /// Where the primary button leads.
    #[must_use]
    pub fn entry_route(&self) -> FlowRoute {
        match self.redirect {
            RedirectTarget::PersonalQuestions | RedirectTarget::Fresh => {
                FlowRoute::Questions(WizardStage::Personal)
            }
            RedirectTarget::ObjectiveQuestions => FlowRoute::Questions(WizardStage::Objective),
            RedirectTarget::Results => FlowRoute::Results,
        }
    }

    #[must_use]
    pub fn button_label(&self) -> &'static str {
        let stage = self.stage();
        if stage == Stage::Completed {
            return "View Results";
        }
        if self.progress.personal_completed.is_set() && !self.progress.objective_completed.is_set()
        {
            return "Continue Objective Questions";
        }
        match stage {
            Stage::Objective => "Continue Assessment",
            Stage::Personal if self.detail(|details| details.personal_completed).is_some() => {
                "Continue Personal Questions"
            }
            Stage::Personal => "Start Personal Questions",
            _ => "Start Assessment",
        }
    }

    #[must_use]
    pub fn can_view_results(&self) -> bool {
        self.redirect == RedirectTarget::Results
    }

    /// A non-zero count from the detailed progress payload.
    fn detail(&self, pick: impl FnOnce(&ProgressDetails) -> Option<u64>) -> Option<u64> {
        self.progress
            .details
            .as_ref()
            .and_then(pick)
            .filter(|count| *count > 0)
    }
}

/// Loads the overview and performs account-level assessment actions.
#[derive(Clone)]
pub struct AssessmentHomeService {
    api: Arc<dyn AssessmentApi>,
}

impl AssessmentHomeService {
    #[must_use]
    pub fn new(api: Arc<dyn AssessmentApi>) -> Self {
        Self { api }
    }

    /// Fetch resume progress, filling in detailed counts and the objective
    /// question total when the server left them out. Failures of those two
    /// follow-up calls are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the resume call fails.
    pub async fn load(&self) -> Result<AssessmentOverview, ApiError> {
        let mut resume = self.api.resume().await?;

        if resume.progress.needs_details() {
            match self.api.progress().await {
                Ok(progress) => {
                    if let Some(details) = progress.progress {
                        resume.progress.details = Some(details);
                    }
                }
                Err(err) => tracing::debug!(error = %err, "detailed progress unavailable"),
            }
        }

        let total_missing = resume
            .total_objective_questions
            .is_none_or(|total| total == 0);
        if resume.progress.personal_completed.is_set() && total_missing {
            match self.api.stage_questions(WizardStage::Objective).await {
                Ok(set) => resume.total_objective_questions = Some(set.questions.len() as u64),
                Err(err) => tracing::debug!(error = %err, "objective question count unavailable"),
            }
        }

        let overview = AssessmentOverview::from_resume(resume);
        tracing::info!(stage = overview.stage().as_str(), "assessment progress loaded");
        Ok(overview)
    }

    /// Results are reachable once the server redirects there. When the
    /// check itself fails, access is allowed.
    pub async fn can_view_results(&self) -> bool {
        match self.api.resume().await {
            Ok(resume) => {
                RedirectTarget::parse(resume.redirect_to.as_deref()) == RedirectTarget::Results
            }
            Err(err) => {
                tracing::debug!(error = %err, "results access check failed; allowing");
                true
            }
        }
    }

    /// Start the assessment over on the server.
    ///
    /// # Errors
    ///
    /// `RetakeError::Refused` when the server answers without success,
    /// `RetakeError::Api` when the call fails.
    pub async fn retake(&self) -> Result<&'static str, RetakeError> {
        let ack = self.api.retake().await?;
        if !ack.success {
            return Err(RetakeError::Refused);
        }
        tracing::info!("assessment reset for retake");
        Ok(MSG_RETAKE_OK)
    }
}
