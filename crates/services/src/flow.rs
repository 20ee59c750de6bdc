//! Stage-to-stage navigation state shared by the assessment screens.

use navi_core::model::{AssessmentSession, SessionId, Stage, StageHandoff};
use navi_core::wizard::WizardStage;

use crate::assessment_home::AssessmentOverview;
use crate::wizard::SubmitOutcome;

/// Assessment screens a flow step can lead to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowRoute {
    Home,
    Questions(WizardStage),
    Results,
}

impl FlowRoute {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            FlowRoute::Home => "/assessment",
            FlowRoute::Questions(WizardStage::Personal) => "/assessment/personal",
            FlowRoute::Questions(WizardStage::Objective) => "/assessment/objective",
            FlowRoute::Results => "/results",
        }
    }
}

/// The current attempt, the questions handed from one stage to the next,
/// and the session whose results should be shown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssessmentFlow {
    session: AssessmentSession,
    handoff: Option<StageHandoff>,
    results_session: Option<SessionId>,
}

impl AssessmentFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        self.session.session_id()
    }

    /// Catch up with server progress. The stage never moves backwards.
    pub fn sync_from_overview(&mut self, overview: &AssessmentOverview) {
        if self.session.advance_to(overview.stage()) {
            tracing::info!(stage = overview.stage().as_str(), "assessment stage synced");
        }
        self.session.set_session_id(overview.session_id().clone());
        if overview.can_view_results() {
            self.results_session = Some(overview.session_id().clone());
        }
    }

    /// Record a stage submission and say where to go next.
    ///
    /// Rejected and failed submissions leave the flow untouched.
    pub fn apply(&mut self, outcome: &SubmitOutcome) -> Option<FlowRoute> {
        match outcome {
            SubmitOutcome::Advanced(handoff) => {
                self.session.advance_to(Stage::Objective);
                self.session.set_session_id(handoff.session_id.clone());
                self.handoff = Some(handoff.clone());
                tracing::info!("personal stage accepted; moving to objective");
                Some(FlowRoute::Questions(WizardStage::Objective))
            }
            SubmitOutcome::Completed { session_id } => {
                self.session.advance_to(Stage::Completed);
                self.session.set_session_id(session_id.clone());
                self.results_session = Some(session_id.clone());
                tracing::info!("objective stage accepted; results ready");
                Some(FlowRoute::Results)
            }
            SubmitOutcome::Rejected(_) | SubmitOutcome::Failed { .. } => None,
        }
    }

    /// Hand the objective questions to the next screen, once.
    pub fn take_handoff(&mut self) -> Option<StageHandoff> {
        self.handoff.take()
    }

    #[must_use]
    pub fn has_handoff(&self) -> bool {
        self.handoff.is_some()
    }

    #[must_use]
    pub fn results_session(&self) -> Option<&SessionId> {
        self.results_session
            .as_ref()
            .filter(|session_id| !session_id.is_empty())
    }

    pub fn retake(&mut self) {
        self.session.retake();
        self.handoff = None;
        self.results_session = None;
    }
}
