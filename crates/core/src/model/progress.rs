use serde::{Deserialize, Serialize};

use super::assessment::Stage;

/// A completion marker reported by the server: either a flag or a count of
/// answered questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionMark {
    Flag(bool),
    Count(u64),
}

impl Default for CompletionMark {
    fn default() -> Self {
        CompletionMark::Flag(false)
    }
}

impl CompletionMark {
    #[must_use]
    pub fn is_set(self) -> bool {
        match self {
            CompletionMark::Flag(flag) => flag,
            CompletionMark::Count(count) => count > 0,
        }
    }

    #[must_use]
    pub fn count(self) -> Option<u64> {
        match self {
            CompletionMark::Count(count) => Some(count),
            CompletionMark::Flag(_) => None,
        }
    }
}

/// Per-stage answered counts from `GET /api/questions/progress`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDetails {
    #[serde(default)]
    pub personal_completed: Option<u64>,
    #[serde(default)]
    pub objective_completed: Option<u64>,
}

/// Server-reported progress. Local state is reconciled toward this, never
/// the other way round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub personal_completed: CompletionMark,
    #[serde(default)]
    pub objective_completed: CompletionMark,
    #[serde(default)]
    pub is_fully_completed: bool,
    #[serde(default)]
    pub details: Option<ProgressDetails>,
}

impl ProgressSnapshot {
    /// Stage shown on the assessment home screen.
    #[must_use]
    pub fn stage(&self) -> Stage {
        if self.is_fully_completed {
            Stage::Completed
        } else if self.objective_completed.is_set() {
            Stage::Objective
        } else if self.personal_completed.is_set() {
            Stage::Personal
        } else {
            Stage::Initial
        }
    }

    /// Whether the detailed counts still need to be fetched.
    #[must_use]
    pub fn needs_details(&self) -> bool {
        (self.personal_completed.is_set() || self.objective_completed.is_set())
            && self
                .details
                .as_ref()
                .is_none_or(|details| details.personal_completed.is_none())
    }

    #[must_use]
    pub fn personal_count(&self) -> u64 {
        self.details
            .as_ref()
            .and_then(|details| details.personal_completed)
            .or(self.personal_completed.count())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn objective_count(&self) -> u64 {
        self.details
            .as_ref()
            .and_then(|details| details.objective_completed)
            .or(self.objective_completed.count())
            .unwrap_or(0)
    }
}

/// Where the server says the user should go next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    PersonalQuestions,
    ObjectiveQuestions,
    Results,
    /// Nothing recognised: start the personal stage from scratch.
    Fresh,
}

impl RedirectTarget {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("personal-questions") => RedirectTarget::PersonalQuestions,
            Some("objective-questions") => RedirectTarget::ObjectiveQuestions,
            Some("results") => RedirectTarget::Results,
            _ => RedirectTarget::Fresh,
        }
    }

    #[must_use]
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            RedirectTarget::PersonalQuestions => Some("personal-questions"),
            RedirectTarget::ObjectiveQuestions => Some("objective-questions"),
            RedirectTarget::Results => Some("results"),
            RedirectTarget::Fresh => None,
        }
    }
}
