mod autosave;
mod controller;

pub use autosave::AutoSaveScheduler;
pub use controller::{
    AUTOSAVE_PERIOD, DEBOUNCE_DELAY, InitOutcome, SaveOutcome, SubmitOutcome, WizardController,
};
