#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod assessment_home;
pub mod auth_flow;
pub mod auth_store;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod results_service;
pub mod wizard;

pub use navi_core::Clock;

pub use app_services::AppServices;
pub use assessment_home::{AssessmentHomeService, AssessmentOverview, StepKind, StepStatus};
pub use auth_flow::{
    AuthFlowService, LoginOutcome, ResetOutcome, SignupOutcome, VerificationTimer, VerifyOutcome,
};
pub use auth_store::{AuthEvent, AuthStore};
pub use config::ApiConfig;
pub use error::{
    ApiError, AppServicesError, AuthFlowError, AuthStoreError, ResultsServiceError, RetakeError,
    WizardServiceError,
};
pub use flow::{AssessmentFlow, FlowRoute};
pub use http::ApiClient;
pub use results_service::ResultsPresenter;
pub use wizard::{InitOutcome, SaveOutcome, SubmitOutcome, WizardController};
