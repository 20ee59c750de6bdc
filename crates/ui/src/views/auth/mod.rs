mod login;
mod password;
mod signup;
mod verify;

use navi_core::auth::FieldErrors;
use services::AuthFlowError;

pub use login::LoginView;
pub use password::{ForgotPasswordView, ResetPasswordView};
pub use signup::SignupView;
pub use verify::VerifyView;

/// Form feedback after a failed submit: per-field messages or one banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FormFeedback {
    pub fields: FieldErrors,
    pub banner: Option<String>,
}

impl FormFeedback {
    pub(crate) fn from_error(err: &AuthFlowError) -> Self {
        match err {
            AuthFlowError::Invalid(fields) => Self {
                fields: fields.clone(),
                banner: None,
            },
            other => Self {
                fields: FieldErrors::new(),
                banner: Some(other.to_string()),
            },
        }
    }

    pub(crate) fn field(&self, name: &str) -> Option<&'static str> {
        self.fields.get(name).copied()
    }
}
