//! The per-stage question wizard: navigation, answers, validation, and the
//! busy flags that keep saves and submits from overlapping.
//!
//! Everything here is synchronous. The services layer drives the I/O and
//! reports results back through the `finish_*` methods.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Question, QuestionId, QuestionOption, ResponseValue, SessionId, ValidationError,
    toggle_selection, validate_response,
};

pub const MSG_LOAD_FAILED: &str = "Failed to load questions. Please try again.";
pub const MSG_INCOMPLETE: &str = "Please answer all questions before continuing.";
pub const MSG_SAVED: &str = "Progress saved!";
pub const MSG_SAVE_FAILED: &str = "Failed to save progress";
pub const MSG_RESUMED: &str = "Resumed your personal assessment progress!";
pub const MSG_RESET: &str = "Progress reset. Starting fresh!";
pub const MSG_RESET_FAILED: &str = "Failed to reset progress";
pub const MSG_SUBMIT_FAILED: &str = "Failed to submit responses. Please try again.";

/// Which questionnaire the wizard is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WizardStage {
    Personal,
    Objective,
}

impl WizardStage {
    /// `step` value sent with saved drafts. Only the personal stage keeps
    /// drafts on the server.
    #[must_use]
    pub fn save_step(self) -> Option<&'static str> {
        match self {
            WizardStage::Personal => Some("personal-questions"),
            WizardStage::Objective => None,
        }
    }

    #[must_use]
    pub fn completion_message(self) -> &'static str {
        match self {
            WizardStage::Personal => "Personal assessment completed!",
            WizardStage::Objective => "Objective assessment completed!",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            WizardStage::Personal => "Personal Discovery",
            WizardStage::Objective => "Dynamic Assessment",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardPhase {
    Loading,
    Ready,
    Submitting,
    Submitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The banner line above the question card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub saved_at: Option<DateTime<Utc>>,
}

impl StatusMessage {
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
            saved_at: None,
        }
    }

    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
            saved_at: None,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            saved_at: None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WizardError {
    #[error("questions are already being fetched")]
    AlreadyFetching,
    #[error("questions are not loaded")]
    NotReady,
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("a save or submit is already in flight")]
    Busy,
    #[error("{missing} question(s) still need an answer")]
    Incomplete { missing: usize },
    #[error("this stage has already been submitted")]
    AlreadySubmitted,
    #[error("reset was not confirmed")]
    ResetNotConfirmed,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// How a user edit changes a response.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseEdit {
    /// Single choice or free text: replace the value outright.
    Replace(ResponseValue),
    /// Multi-select: add or remove one option.
    Toggle(QuestionOption),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub answer: String,
}

/// Body of a stage submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub responses: Vec<AnswerRecord>,
    pub session_id: SessionId,
}

/// Body of `POST /api/questions/save-progress`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub step: &'static str,
    pub session_id: SessionId,
    pub personal_responses: BTreeMap<QuestionId, ResponseValue>,
    pub current_question_index: usize,
    pub personal_questions: Vec<Question>,
}

/// Index to resume at: one past the last answered question, clamped to the
/// last question, or 0 when nothing is answered.
#[must_use]
pub fn resume_index(
    questions: &[Question],
    responses: &BTreeMap<QuestionId, ResponseValue>,
) -> usize {
    let last_answered = questions.iter().rposition(|question| {
        responses
            .get(question.id())
            .is_some_and(ResponseValue::is_answered)
    });
    match last_answered {
        Some(index) => (index + 1).min(questions.len().saturating_sub(1)),
        None => 0,
    }
}

#[derive(Clone, Debug)]
pub struct Wizard {
    stage: WizardStage,
    phase: WizardPhase,
    questions: Vec<Question>,
    responses: BTreeMap<QuestionId, ResponseValue>,
    errors: BTreeMap<QuestionId, ValidationError>,
    current: usize,
    session_id: SessionId,
    fetch_started: bool,
    saving: bool,
    resumed: bool,
    reset_requested: bool,
    status: Option<StatusMessage>,
}

impl Wizard {
    #[must_use]
    pub fn new(stage: WizardStage) -> Self {
        Self {
            stage,
            phase: WizardPhase::Loading,
            questions: Vec::new(),
            responses: BTreeMap::new(),
            errors: BTreeMap::new(),
            current: 0,
            session_id: SessionId::default(),
            fetch_started: false,
            saving: false,
            resumed: false,
            reset_requested: false,
            status: None,
        }
    }

    /// Claim the one initial fetch allowed per wizard.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::AlreadyFetching` while a claim is held; only a
    /// failed load releases it.
    pub fn begin_fetch(&mut self) -> Result<(), WizardError> {
        if self.fetch_started {
            return Err(WizardError::AlreadyFetching);
        }
        self.fetch_started = true;
        self.phase = WizardPhase::Loading;
        Ok(())
    }

    /// Populate with fresh questions; every question starts unanswered.
    pub fn load(&mut self, questions: Vec<Question>, session_id: SessionId) {
        self.fetch_started = true;
        self.responses = questions
            .iter()
            .map(|question| (question.id().clone(), ResponseValue::empty_for(question)))
            .collect();
        self.questions = questions;
        self.errors.clear();
        self.current = 0;
        self.session_id = session_id;
        self.resumed = false;
        self.phase = WizardPhase::Ready;
    }

    /// Populate from a saved draft and jump to the first unanswered spot.
    /// Saved answers for questions not in the set are dropped.
    pub fn resume(
        &mut self,
        questions: Vec<Question>,
        mut saved: BTreeMap<QuestionId, ResponseValue>,
        session_id: SessionId,
    ) {
        self.load(questions, session_id);
        for (id, value) in &mut self.responses {
            if let Some(saved_value) = saved.remove(id) {
                *value = saved_value;
            }
        }
        self.current = resume_index(&self.questions, &self.responses);
        self.resumed = true;
        self.status = Some(StatusMessage::info(MSG_RESUMED));
    }

    /// Loading failed: stay usable with an error banner. The fetch claim is
    /// released so a retry may load again.
    pub fn fail_load(&mut self) {
        self.fetch_started = false;
        self.phase = WizardPhase::Ready;
        self.status = Some(StatusMessage::error(MSG_LOAD_FAILED));
    }

    /// Apply a user edit and clear that question's validation error.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NotReady` outside the ready phase and
    /// `WizardError::UnknownQuestion` for an id not in the set.
    pub fn record_response(
        &mut self,
        id: &QuestionId,
        edit: ResponseEdit,
    ) -> Result<(), WizardError> {
        if self.phase != WizardPhase::Ready {
            return Err(WizardError::NotReady);
        }
        let question = self
            .questions
            .iter()
            .find(|question| question.id() == id)
            .ok_or_else(|| WizardError::UnknownQuestion(id.clone()))?;
        let next = match edit {
            ResponseEdit::Replace(value) => value,
            ResponseEdit::Toggle(option) => {
                toggle_selection(self.responses.get(id), option, question.max_selections())
            }
        };
        self.responses.insert(id.clone(), next);
        self.errors.remove(id);
        Ok(())
    }

    /// Check the current question, recording an error when it fails.
    ///
    /// # Errors
    ///
    /// Returns the question's `ValidationError`.
    pub fn validate_current(&mut self) -> Result<(), ValidationError> {
        let Some(question) = self.questions.get(self.current) else {
            return Ok(());
        };
        let id = question.id().clone();
        match validate_response(question, self.responses.get(&id)) {
            Ok(()) => {
                self.errors.remove(&id);
                Ok(())
            }
            Err(err) => {
                self.errors.insert(id, err);
                Err(err)
            }
        }
    }

    /// Move forward if the current answer validates.
    ///
    /// Returns whether the index moved; on the last question it stays put.
    ///
    /// # Errors
    ///
    /// Returns the current question's `ValidationError`.
    pub fn advance(&mut self) -> Result<bool, ValidationError> {
        self.validate_current()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Move back one question. Never validates.
    pub fn retreat(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Validate every question; returns how many fail.
    pub fn validate_all(&mut self) -> usize {
        self.errors = self
            .questions
            .iter()
            .filter_map(|question| {
                validate_response(question, self.responses.get(question.id()))
                    .err()
                    .map(|err| (question.id().clone(), err))
            })
            .collect();
        self.errors.len()
    }

    /// Claim the save slot and build the draft to send.
    ///
    /// Returns `None` while another save or a submit is in flight, before
    /// questions are loaded, and for stages without drafts.
    pub fn begin_save(&mut self) -> Option<DraftSnapshot> {
        let step = self.stage.save_step()?;
        if self.saving || self.phase != WizardPhase::Ready || self.questions.is_empty() {
            return None;
        }
        self.saving = true;
        Some(DraftSnapshot {
            step,
            session_id: self.session_id.clone(),
            personal_responses: self.responses.clone(),
            current_question_index: self.current,
            personal_questions: self.questions.clone(),
        })
    }

    /// Release the save slot. Silent saves never touch the banner.
    pub fn finish_save<E>(&mut self, result: Result<(), E>, announce: bool, at: DateTime<Utc>) {
        self.saving = false;
        if !announce {
            return;
        }
        self.status = Some(match result {
            Ok(()) => StatusMessage {
                saved_at: Some(at),
                ..StatusMessage::success(MSG_SAVED)
            },
            Err(_) => StatusMessage::error(MSG_SAVE_FAILED),
        });
    }

    /// Validate everything and, if complete, enter the submitting phase.
    ///
    /// # Errors
    ///
    /// `Busy` while a save or submit is in flight, `AlreadySubmitted` after
    /// success, `NotReady` while loading, and `Incomplete` when any question
    /// fails validation (the banner says so and nothing is sent).
    pub fn begin_submit(&mut self) -> Result<Submission, WizardError> {
        match self.phase {
            WizardPhase::Submitted => return Err(WizardError::AlreadySubmitted),
            WizardPhase::Submitting => return Err(WizardError::Busy),
            WizardPhase::Loading => return Err(WizardError::NotReady),
            WizardPhase::Ready => {}
        }
        if self.saving {
            return Err(WizardError::Busy);
        }
        if self.questions.is_empty() {
            return Err(WizardError::NotReady);
        }
        let missing = self.validate_all();
        if missing > 0 {
            self.status = Some(StatusMessage::error(MSG_INCOMPLETE));
            return Err(WizardError::Incomplete { missing });
        }

        self.phase = WizardPhase::Submitting;
        Ok(Submission {
            responses: self
                .questions
                .iter()
                .map(|question| AnswerRecord {
                    question_id: question.id().clone(),
                    answer: self
                        .responses
                        .get(question.id())
                        .map(ResponseValue::to_answer_string)
                        .unwrap_or_default(),
                })
                .collect(),
            session_id: self.session_id.clone(),
        })
    }

    /// Record the server's verdict on a submission. A failure returns the
    /// wizard to `Ready` with the server's message.
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.phase = WizardPhase::Submitted;
                self.status = Some(StatusMessage::success(self.stage.completion_message()));
            }
            Err(message) => {
                self.phase = WizardPhase::Ready;
                self.status = Some(StatusMessage::error(message));
            }
        }
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    pub fn cancel_reset(&mut self) {
        self.reset_requested = false;
    }

    /// Consume a pending confirmation and enter the loading phase.
    ///
    /// # Errors
    ///
    /// `ResetNotConfirmed` without a prior `request_reset`, `Busy` while a
    /// save or submit is in flight.
    pub fn confirm_reset(&mut self) -> Result<(), WizardError> {
        if !self.reset_requested {
            return Err(WizardError::ResetNotConfirmed);
        }
        if self.saving || self.phase == WizardPhase::Submitting {
            return Err(WizardError::Busy);
        }
        self.reset_requested = false;
        self.phase = WizardPhase::Loading;
        Ok(())
    }

    /// Fresh questions after a confirmed reset.
    pub fn finish_reset(&mut self, questions: Vec<Question>, session_id: SessionId) {
        self.load(questions, session_id);
        self.status = Some(StatusMessage::info(MSG_RESET));
    }

    pub fn fail_reset(&mut self) {
        self.phase = WizardPhase::Ready;
        self.status = Some(StatusMessage::error(MSG_RESET_FAILED));
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    #[must_use]
    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    #[must_use]
    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn response(&self, id: &QuestionId) -> Option<&ResponseValue> {
        self.responses.get(id)
    }

    #[must_use]
    pub fn responses(&self) -> &BTreeMap<QuestionId, ResponseValue> {
        &self.responses
    }

    #[must_use]
    pub fn error(&self, id: &QuestionId) -> Option<ValidationError> {
        self.errors.get(id).copied()
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.saving || self.is_submitting()
    }

    /// Only a submission locks navigation; background saves do not.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    #[must_use]
    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| {
                self.responses
                    .get(question.id())
                    .is_some_and(ResponseValue::is_answered)
            })
            .count()
    }

    /// `round(answered / total * 100)`, 0 for an empty set.
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        let total = self.questions.len();
        if total == 0 {
            return 0;
        }
        let answered = self.answered_count();
        u8::try_from((answered * 100 + total / 2) / total).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputType;
    use crate::time::fixed_now;

    fn open(id: &str) -> Question {
        Question::new(QuestionId::new(id), id, InputType::OpenEnded, Vec::new())
    }

    fn multi(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            id,
            InputType::MultipleChoice,
            vec!["A".into(), "B".into()],
        )
    }

    fn loaded(stage: WizardStage, questions: Vec<Question>) -> Wizard {
        let mut wizard = Wizard::new(stage);
        wizard.begin_fetch().unwrap();
        wizard.load(questions, SessionId::new("s1"));
        wizard
    }

    fn text(value: &str) -> ResponseEdit {
        ResponseEdit::Replace(ResponseValue::Text(value.into()))
    }

    #[test]
    fn failed_load_shows_a_banner_and_allows_a_retry() {
        let mut wizard = Wizard::new(WizardStage::Objective);
        wizard.begin_fetch().unwrap();
        assert_eq!(wizard.begin_fetch(), Err(WizardError::AlreadyFetching));

        wizard.fail_load();
        assert_eq!(wizard.phase(), WizardPhase::Ready);
        assert!(wizard.questions().is_empty());
        let status = wizard.status().unwrap();
        assert_eq!(status.text, MSG_LOAD_FAILED);
        assert_eq!(status.kind, StatusKind::Error);

        assert!(wizard.begin_fetch().is_ok());
        wizard.load(vec![open("q1")], SessionId::new("s1"));
        assert_eq!(wizard.questions().len(), 1);
    }

    #[test]
    fn load_creates_one_empty_response_per_question() {
        let wizard = loaded(WizardStage::Personal, vec![open("q1"), multi("q2")]);
        assert_eq!(wizard.responses().len(), 2);
        assert_eq!(
            wizard.response(&QuestionId::new("q2")),
            Some(&ResponseValue::Selections(Vec::new()))
        );
        assert_eq!(wizard.phase(), WizardPhase::Ready);
        assert_eq!(wizard.progress_percentage(), 0);
    }

    #[test]
    fn fetch_is_claimed_once() {
        let mut wizard = Wizard::new(WizardStage::Objective);
        assert!(wizard.begin_fetch().is_ok());
        assert_eq!(wizard.begin_fetch(), Err(WizardError::AlreadyFetching));
    }

    #[test]
    fn resume_starts_after_last_answer() {
        let questions = vec![open("q1"), open("q2"), open("q3")];
        let mut saved = BTreeMap::new();
        saved.insert(QuestionId::new("q2"), ResponseValue::Text("yes".into()));
        saved.insert(QuestionId::new("stale"), ResponseValue::Text("drop".into()));

        let mut wizard = Wizard::new(WizardStage::Personal);
        wizard.resume(questions.clone(), saved, SessionId::new("s1"));
        assert_eq!(wizard.current_index(), 2);
        assert_eq!(wizard.responses().len(), 3);
        assert!(wizard.is_resumed());
        assert_eq!(wizard.status().unwrap().text, MSG_RESUMED);

        let mut last = BTreeMap::new();
        last.insert(QuestionId::new("q3"), ResponseValue::Text("done".into()));
        assert_eq!(resume_index(&questions, &last), 2);
        assert_eq!(resume_index(&questions, &BTreeMap::new()), 0);
    }

    #[test]
    fn advance_blocks_on_invalid_answer_but_retreat_does_not() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1"), open("q2")]);
        let q1 = QuestionId::new("q1");
        assert_eq!(wizard.advance(), Err(ValidationError::Required));
        assert_eq!(wizard.error(&q1), Some(ValidationError::Required));

        wizard.record_response(&q1, text("hello")).unwrap();
        assert_eq!(wizard.error(&q1), None);
        assert_eq!(wizard.advance(), Ok(true));
        assert_eq!(wizard.current_index(), 1);

        assert!(wizard.retreat());
        assert!(!wizard.retreat());
        assert_eq!(wizard.current_index(), 0);
    }

    #[test]
    fn advance_on_last_question_stays_in_bounds() {
        let mut wizard = loaded(WizardStage::Objective, vec![open("q1")]);
        wizard.record_response(&QuestionId::new("q1"), text("a")).unwrap();
        assert_eq!(wizard.advance(), Ok(false));
        assert_eq!(wizard.current_index(), 0);
        assert!(wizard.is_last_question());
    }

    #[test]
    fn toggle_edits_apply_to_multi_select() {
        let mut wizard = loaded(WizardStage::Personal, vec![multi("q1")]);
        let id = QuestionId::new("q1");
        wizard.record_response(&id, ResponseEdit::Toggle("A".into())).unwrap();
        wizard.record_response(&id, ResponseEdit::Toggle("B".into())).unwrap();
        wizard.record_response(&id, ResponseEdit::Toggle("A".into())).unwrap();
        assert_eq!(
            wizard.response(&id).unwrap().selections(),
            &[QuestionOption::from("B")]
        );
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1")]);
        let err = wizard.record_response(&QuestionId::new("nope"), text("x"));
        assert_eq!(err, Err(WizardError::UnknownQuestion(QuestionId::new("nope"))));
    }

    #[test]
    fn submit_fails_iff_some_answer_is_invalid() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1"), multi("q2")]);
        wizard.record_response(&QuestionId::new("q1"), text("x")).unwrap();
        assert_eq!(wizard.begin_submit(), Err(WizardError::Incomplete { missing: 1 }));
        assert_eq!(wizard.status().unwrap().text, MSG_INCOMPLETE);
        assert_eq!(wizard.phase(), WizardPhase::Ready);

        wizard
            .record_response(&QuestionId::new("q2"), ResponseEdit::Toggle("B".into()))
            .unwrap();
        let submission = wizard.begin_submit().unwrap();
        assert_eq!(wizard.phase(), WizardPhase::Submitting);
        assert_eq!(submission.session_id, SessionId::new("s1"));
        assert_eq!(submission.responses[0].answer, "x");
        assert_eq!(submission.responses[1].answer, r#"["B"]"#);
    }

    #[test]
    fn failed_submit_returns_to_ready_with_server_message() {
        let mut wizard = loaded(WizardStage::Objective, vec![open("q1")]);
        wizard.record_response(&QuestionId::new("q1"), text("x")).unwrap();
        wizard.begin_submit().unwrap();
        assert_eq!(wizard.begin_submit(), Err(WizardError::Busy));
        wizard.finish_submit(Err("Session not found".into()));
        assert_eq!(wizard.phase(), WizardPhase::Ready);
        assert_eq!(wizard.status().unwrap().text, "Session not found");

        wizard.begin_submit().unwrap();
        wizard.finish_submit(Ok(()));
        assert_eq!(wizard.phase(), WizardPhase::Submitted);
        assert_eq!(wizard.begin_submit(), Err(WizardError::AlreadySubmitted));
    }

    #[test]
    fn saves_are_exclusive_with_each_other_and_submit() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1")]);
        wizard.record_response(&QuestionId::new("q1"), text("x")).unwrap();
        let draft = wizard.begin_save().unwrap();
        assert_eq!(draft.step, "personal-questions");
        assert!(wizard.begin_save().is_none());
        assert_eq!(wizard.begin_submit(), Err(WizardError::Busy));

        wizard.finish_save::<()>(Ok(()), true, fixed_now());
        assert_eq!(wizard.status().unwrap().text, MSG_SAVED);
        assert_eq!(wizard.status().unwrap().saved_at, Some(fixed_now()));

        wizard.begin_submit().unwrap();
        assert!(wizard.begin_save().is_none());
    }

    #[test]
    fn navigation_stays_open_during_a_background_save() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1"), open("q2")]);
        wizard.record_response(&QuestionId::new("q1"), text("x")).unwrap();
        wizard.begin_save().unwrap();
        assert!(wizard.is_busy());
        assert!(!wizard.is_submitting());

        assert_eq!(wizard.advance(), Ok(true));
        assert!(wizard.retreat());
        wizard.finish_save::<()>(Ok(()), false, fixed_now());

        wizard.record_response(&QuestionId::new("q2"), text("y")).unwrap();
        wizard.begin_submit().unwrap();
        assert!(wizard.is_submitting());
    }

    #[test]
    fn silent_save_failure_leaves_banner_alone() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1")]);
        wizard.begin_save().unwrap();
        wizard.finish_save(Err("offline"), false, fixed_now());
        assert!(wizard.status().is_none());
        assert!(!wizard.is_saving());
    }

    #[test]
    fn objective_stage_keeps_no_drafts() {
        let mut wizard = loaded(WizardStage::Objective, vec![open("q1")]);
        assert!(wizard.begin_save().is_none());
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("q1")]);
        wizard.record_response(&QuestionId::new("q1"), text("x")).unwrap();
        assert_eq!(wizard.confirm_reset(), Err(WizardError::ResetNotConfirmed));
        wizard.request_reset();
        wizard.cancel_reset();
        assert_eq!(wizard.confirm_reset(), Err(WizardError::ResetNotConfirmed));

        wizard.request_reset();
        wizard.confirm_reset().unwrap();
        assert_eq!(wizard.phase(), WizardPhase::Loading);
        wizard.finish_reset(vec![open("q1"), open("q2")], SessionId::new("s2"));
        assert_eq!(wizard.answered_count(), 0);
        assert_eq!(wizard.status().unwrap().text, MSG_RESET);
    }

    #[test]
    fn percentage_rounds() {
        let mut wizard = loaded(WizardStage::Personal, vec![open("a"), open("b"), open("c")]);
        wizard.record_response(&QuestionId::new("a"), text("x")).unwrap();
        assert_eq!(wizard.progress_percentage(), 33);
        wizard.record_response(&QuestionId::new("b"), text("x")).unwrap();
        assert_eq!(wizard.progress_percentage(), 67);
    }
}
