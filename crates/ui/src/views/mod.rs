mod assessment;
mod auth;
mod landing;
mod questions;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use assessment::AssessmentHomeView;
pub use auth::{ForgotPasswordView, LoginView, ResetPasswordView, SignupView, VerifyView};
pub use landing::{LandingView, NotFoundView};
pub use questions::{ObjectiveQuestionsView, PersonalQuestionsView, QuestionsView};
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
