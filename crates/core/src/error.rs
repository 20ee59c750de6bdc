use thiserror::Error;

use crate::model::{ParseIdError, ValidationError};
use crate::results::ResultsError;
use crate::wizard::WizardError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Results(#[from] ResultsError),
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}
