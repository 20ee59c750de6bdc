use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;

use navi_core::Clock;
use navi_core::model::{
    Question, QuestionId, ResponseValue, SessionId, StageHandoff, ValidationError,
};
use navi_core::wizard::{
    MSG_SUBMIT_FAILED, ResponseEdit, Wizard, WizardError, WizardPhase, WizardStage,
};

use crate::api::AssessmentApi;
use crate::error::WizardServiceError;
use crate::wizard::autosave::AutoSaveScheduler;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1500);
pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(30);

type SavedDraft = (Vec<Question>, BTreeMap<QuestionId, ResponseValue>, SessionId);

/// How the question set was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// Taken from the previous stage's submit response.
    FromHandoff,
    /// Restored from a server-side draft.
    Resumed,
    Fresh,
    /// Fetch failed; the wizard shows an error banner.
    Failed,
    /// A fetch was already claimed for this wizard.
    AlreadyInitialized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
    /// Nothing to save, or another save or submit is in flight.
    Skipped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Personal answers accepted; the objective set travels with it.
    Advanced(StageHandoff),
    /// Objective answers accepted; results are ready for this session.
    Completed { session_id: SessionId },
    /// Nothing was sent.
    Rejected(WizardError),
    /// The server refused or could not be reached.
    Failed { message: String },
}

/// Drives one stage's [`Wizard`] against the remote API.
///
/// Cloning is cheap; clones share the same wizard. Views observe changes
/// through [`WizardController::subscribe`].
#[derive(Clone)]
pub struct WizardController {
    inner: Arc<Inner>,
}

struct Inner {
    wizard: Mutex<Wizard>,
    api: Arc<dyn AssessmentApi>,
    clock: Clock,
    changes: watch::Sender<u64>,
    autosave: AutoSaveScheduler,
    debounce_delay: Duration,
    autosave_period: Duration,
}

impl WizardController {
    #[must_use]
    pub fn new(stage: WizardStage, api: Arc<dyn AssessmentApi>, clock: Clock) -> Self {
        Self::with_timings(stage, api, clock, DEBOUNCE_DELAY, AUTOSAVE_PERIOD)
    }

    #[must_use]
    pub fn with_timings(
        stage: WizardStage,
        api: Arc<dyn AssessmentApi>,
        clock: Clock,
        debounce_delay: Duration,
        autosave_period: Duration,
    ) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                wizard: Mutex::new(Wizard::new(stage)),
                api,
                clock,
                changes,
                autosave: AutoSaveScheduler::new(),
                debounce_delay,
                autosave_period,
            }),
        }
    }

    #[must_use]
    pub fn stage(&self) -> WizardStage {
        self.read(Wizard::stage)
    }

    /// Inspect the wizard without holding the lock across an await.
    pub fn read<R>(&self, f: impl FnOnce(&Wizard) -> R) -> R {
        f(&self.inner.wizard.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// A receiver that ticks after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Load the question set, at most once per controller.
    ///
    /// A non-empty handoff wins. The personal stage then tries to resume a
    /// server-side draft before fetching fresh questions.
    pub async fn initialize(&self, handoff: Option<StageHandoff>) -> InitOutcome {
        if self.update(Wizard::begin_fetch).is_err() {
            return InitOutcome::AlreadyInitialized;
        }

        if let Some(handoff) = handoff.filter(|handoff| !handoff.is_empty()) {
            self.update(|wizard| wizard.load(handoff.questions, handoff.session_id));
            return InitOutcome::FromHandoff;
        }

        let stage = self.stage();
        if stage == WizardStage::Personal {
            if let Some((questions, responses, session_id)) = self.fetch_draft().await {
                tracing::info!(questions = questions.len(), "resuming personal draft");
                self.update(|wizard| wizard.resume(questions, responses, session_id));
                return InitOutcome::Resumed;
            }
        }

        match self.inner.api.stage_questions(stage).await {
            Ok(set) => {
                self.update(|wizard| wizard.load(set.questions, set.session_id));
                InitOutcome::Fresh
            }
            Err(err) => {
                tracing::warn!(error = %err, stage = ?stage, "failed to load questions");
                self.update(Wizard::fail_load);
                InitOutcome::Failed
            }
        }
    }

    async fn fetch_draft(&self) -> Option<SavedDraft> {
        let progress = match self.inner.api.progress().await {
            Ok(progress) => progress,
            Err(err) => {
                tracing::debug!(error = %err, "progress check failed; starting fresh");
                return None;
            }
        };
        if !progress.has_personal_draft() {
            return None;
        }
        match self.inner.api.resume().await {
            Ok(resume) => resume.into_personal_draft(),
            Err(err) => {
                tracing::debug!(error = %err, "could not resume draft; starting fresh");
                None
            }
        }
    }

    /// Apply an edit and schedule a debounced silent save.
    ///
    /// # Errors
    ///
    /// Returns `WizardError` if questions are not loaded or the id is unknown.
    pub fn record_response(&self, id: &QuestionId, edit: ResponseEdit) -> Result<(), WizardError> {
        let keeps_drafts = self.update(|wizard| {
            wizard.record_response(id, edit)?;
            Ok::<_, WizardError>(
                wizard.stage().save_step().is_some() && !wizard.session_id().is_empty(),
            )
        })?;
        if keeps_drafts {
            let weak = Arc::downgrade(&self.inner);
            self.inner
                .autosave
                .debounce(self.inner.debounce_delay, move || silent_save(weak));
        }
        Ok(())
    }

    /// Move forward, saving silently when the index moved.
    ///
    /// # Errors
    ///
    /// Returns the current question's `ValidationError`; the index stays put.
    pub async fn advance(&self) -> Result<bool, ValidationError> {
        let moved = self.update(Wizard::advance)?;
        if moved {
            self.save(false).await;
        }
        Ok(moved)
    }

    pub fn retreat(&self) -> bool {
        self.update(Wizard::retreat)
    }

    /// Send the current draft. `announce` controls the status banner.
    pub async fn save(&self, announce: bool) -> SaveOutcome {
        let Some(draft) = self.update(Wizard::begin_save) else {
            return SaveOutcome::Skipped;
        };
        let result = self.inner.api.save_progress(&draft).await;
        let outcome = match &result {
            Ok(()) => SaveOutcome::Saved,
            Err(err) => {
                tracing::warn!(error = %err, "failed to save progress");
                SaveOutcome::Failed
            }
        };
        let now = self.inner.clock.now();
        self.update(|wizard| wizard.finish_save(result, announce, now));
        outcome
    }

    /// Start the fixed-period silent save for stages that keep drafts.
    pub fn start_autosave(&self) {
        if self.stage().save_step().is_none() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .autosave
            .every(self.inner.autosave_period, move || silent_save(weak.clone()));
    }

    pub fn stop_autosave(&self) {
        self.inner.autosave.cancel_all();
    }

    /// Validate every answer and post them.
    pub async fn submit(&self) -> SubmitOutcome {
        let submission = match self.update(Wizard::begin_submit) {
            Ok(submission) => submission,
            Err(err) => return SubmitOutcome::Rejected(err),
        };
        let stage = self.stage();
        tracing::info!(stage = ?stage, answers = submission.responses.len(), "submitting stage");

        let result = match stage {
            WizardStage::Personal => self
                .inner
                .api
                .submit_personal(&submission)
                .await
                .map(|response| {
                    let session_id =
                        prefer_server_session(response.session_id, &submission.session_id);
                    SubmitOutcome::Advanced(StageHandoff::new(
                        response.objective_questions,
                        session_id,
                    ))
                })
                .map_err(|err| err.user_message(MSG_SUBMIT_FAILED)),
            WizardStage::Objective => self
                .inner
                .api
                .submit_objective(&submission)
                .await
                .map(|response| SubmitOutcome::Completed {
                    session_id: prefer_server_session(response.session_id, &submission.session_id),
                })
                .map_err(|err| err.user_message(MSG_SUBMIT_FAILED)),
        };

        match result {
            Ok(outcome) => {
                self.inner.autosave.cancel_all();
                self.update(|wizard| wizard.finish_submit(Ok(())));
                tracing::info!(stage = ?stage, "stage submitted");
                outcome
            }
            Err(message) => {
                tracing::warn!(stage = ?stage, message = %message, "submission failed");
                self.update(|wizard| wizard.finish_submit(Err(message.clone())));
                SubmitOutcome::Failed { message }
            }
        }
    }

    pub fn request_reset(&self) {
        self.update(Wizard::request_reset);
    }

    pub fn cancel_reset(&self) {
        self.update(Wizard::cancel_reset);
    }

    /// Clear the server draft and start over with fresh questions.
    ///
    /// # Errors
    ///
    /// `Wizard(ResetNotConfirmed)` without a prior `request_reset`,
    /// `Wizard(Busy)` mid-save, `Api` when the server calls fail (the
    /// wizard then shows the reset-failed banner).
    pub async fn confirm_reset(&self) -> Result<(), WizardServiceError> {
        self.update(Wizard::confirm_reset)?;
        self.inner.autosave.cancel_debounce();

        let stage = self.stage();
        let fetched = async {
            self.inner.api.clear_progress().await?;
            self.inner.api.stage_questions(stage).await
        }
        .await;

        match fetched {
            Ok(set) => {
                tracing::info!(stage = ?stage, "progress reset");
                self.update(|wizard| wizard.finish_reset(set.questions, set.session_id));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to reset progress");
                self.update(Wizard::fail_reset);
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> WizardPhase {
        self.read(Wizard::phase)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Wizard) -> R) -> R {
        let result = {
            let mut wizard = self
                .inner
                .wizard
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut wizard)
        };
        self.inner.changes.send_modify(|version| *version += 1);
        result
    }
}

fn prefer_server_session(returned: SessionId, sent: &SessionId) -> SessionId {
    if returned.is_empty() {
        sent.clone()
    } else {
        returned
    }
}

async fn silent_save(inner: Weak<Inner>) {
    if let Some(inner) = inner.upgrade() {
        WizardController { inner }.save(false).await;
    }
}
