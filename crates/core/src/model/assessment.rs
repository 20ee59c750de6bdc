use serde::{Deserialize, Serialize};

use super::ids::SessionId;
use super::question::Question;

/// Phase of the assessment as the user sees it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Initial,
    Personal,
    Objective,
    Completed,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Personal => "personal",
            Stage::Objective => "objective",
            Stage::Completed => "completed",
        }
    }
}

/// Client view of one assessment attempt.
///
/// The stage only moves forward; `retake` is the one way back to `Initial`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssessmentSession {
    session_id: SessionId,
    stage: Stage,
    current_question_index: usize,
}

impl AssessmentSession {
    #[must_use]
    pub fn new(session_id: SessionId, stage: Stage) -> Self {
        Self {
            session_id,
            stage,
            current_question_index: 0,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn set_session_id(&mut self, session_id: SessionId) {
        if !session_id.is_empty() {
            self.session_id = session_id;
        }
    }

    pub fn set_current_question_index(&mut self, index: usize) {
        self.current_question_index = index;
    }

    /// Move to `stage` if it is later than the current one.
    ///
    /// Returns `true` when the stage changed.
    pub fn advance_to(&mut self, stage: Stage) -> bool {
        if stage > self.stage {
            self.stage = stage;
            self.current_question_index = 0;
            true
        } else {
            false
        }
    }

    /// Start over from the beginning.
    pub fn retake(&mut self) {
        *self = Self::default();
    }
}

/// Questions for the next stage carried across a navigation so the next
/// screen does not have to fetch them again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageHandoff {
    pub questions: Vec<Question>,
    pub session_id: SessionId,
}

impl StageHandoff {
    #[must_use]
    pub fn new(questions: Vec<Question>, session_id: SessionId) -> Self {
        Self {
            questions,
            session_id,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_never_moves_backwards() {
        let mut session = AssessmentSession::new(SessionId::new("s1"), Stage::Objective);
        assert!(!session.advance_to(Stage::Personal));
        assert_eq!(session.stage(), Stage::Objective);
        assert!(session.advance_to(Stage::Completed));
        assert_eq!(session.stage(), Stage::Completed);
    }

    #[test]
    fn retake_resets_to_initial() {
        let mut session = AssessmentSession::new(SessionId::new("s1"), Stage::Completed);
        session.set_current_question_index(4);
        session.retake();
        assert_eq!(session.stage(), Stage::Initial);
        assert!(session.session_id().is_empty());
        assert_eq!(session.current_question_index(), 0);
    }

    #[test]
    fn stages_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Objective).unwrap(), "\"objective\"");
    }
}
