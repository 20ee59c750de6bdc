use std::sync::Arc;

use navi_core::wizard::WizardStage;
use storage::repository::Storage;

use crate::Clock;
use crate::api::{AssessmentApi, AuthApi, CareerApi};
use crate::assessment_home::AssessmentHomeService;
use crate::auth_flow::AuthFlowService;
use crate::auth_store::AuthStore;
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::http::ApiClient;
use crate::results_service::ResultsPresenter;
use crate::wizard::WizardController;

/// Assembles app-facing services around one auth store and one API client.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    auth: Arc<AuthStore>,
    assessment_api: Arc<dyn AssessmentApi>,
    auth_flow: Arc<AuthFlowService>,
    home: Arc<AssessmentHomeService>,
    results: Arc<ResultsPresenter>,
}

impl AppServices {
    /// Build services that talk to the configured backend over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn new(
        storage: Storage,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let auth = Arc::new(AuthStore::new(storage, clock));
        let client = Arc::new(ApiClient::new(config, Arc::clone(&auth))?);
        tracing::info!(base_url = %client.config().base_url, "api client ready");
        Ok(Self::with_apis(
            clock,
            auth,
            Arc::clone(&client) as Arc<dyn AssessmentApi>,
            Arc::clone(&client) as Arc<dyn CareerApi>,
            client,
        ))
    }

    /// Build services over caller-supplied API implementations.
    #[must_use]
    pub fn with_apis(
        clock: Clock,
        auth: Arc<AuthStore>,
        assessment_api: Arc<dyn AssessmentApi>,
        career_api: Arc<dyn CareerApi>,
        auth_api: Arc<dyn AuthApi>,
    ) -> Self {
        let auth_flow = Arc::new(AuthFlowService::new(auth_api, Arc::clone(&auth)));
        let home = Arc::new(AssessmentHomeService::new(Arc::clone(&assessment_api)));
        let results = Arc::new(ResultsPresenter::new(career_api));
        Self {
            clock,
            auth,
            assessment_api,
            auth_flow,
            home,
            results,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthStore> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn auth_flow(&self) -> Arc<AuthFlowService> {
        Arc::clone(&self.auth_flow)
    }

    #[must_use]
    pub fn home(&self) -> Arc<AssessmentHomeService> {
        Arc::clone(&self.home)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsPresenter> {
        Arc::clone(&self.results)
    }

    /// A fresh controller for one questionnaire screen.
    #[must_use]
    pub fn wizard(&self, stage: WizardStage) -> WizardController {
        WizardController::new(stage, Arc::clone(&self.assessment_api), self.clock)
    }
}
