use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use navi_core::wizard::WizardStage;
use services::{
    AppServices, AssessmentFlow, AssessmentHomeService, AuthFlowService, AuthStore,
    ResultsPresenter, WizardController,
};

/// What the views need from the composition root.
pub trait UiApp: Send + Sync {
    fn auth(&self) -> Arc<AuthStore>;
    fn auth_flow(&self) -> Arc<AuthFlowService>;
    fn home(&self) -> Arc<AssessmentHomeService>;
    fn results(&self) -> Arc<ResultsPresenter>;
    fn wizard(&self, stage: WizardStage) -> WizardController;
}

impl UiApp for AppServices {
    fn auth(&self) -> Arc<AuthStore> {
        AppServices::auth(self)
    }

    fn auth_flow(&self) -> Arc<AuthFlowService> {
        AppServices::auth_flow(self)
    }

    fn home(&self) -> Arc<AssessmentHomeService> {
        AppServices::home(self)
    }

    fn results(&self) -> Arc<ResultsPresenter> {
        AppServices::results(self)
    }

    fn wizard(&self, stage: WizardStage) -> WizardController {
        AppServices::wizard(self, stage)
    }
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    flow: Arc<Mutex<AssessmentFlow>>,
    notice: Arc<Mutex<Option<String>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: Arc<dyn UiApp>) -> Self {
        Self {
            app,
            flow: Arc::new(Mutex::new(AssessmentFlow::new())),
            notice: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthStore> {
        self.app.auth()
    }

    #[must_use]
    pub fn auth_flow(&self) -> Arc<AuthFlowService> {
        self.app.auth_flow()
    }

    #[must_use]
    pub fn home(&self) -> Arc<AssessmentHomeService> {
        self.app.home()
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsPresenter> {
        self.app.results()
    }

    #[must_use]
    pub fn wizard(&self, stage: WizardStage) -> WizardController {
        self.app.wizard(stage)
    }

    /// Stage, handoff and results session shared by the assessment screens.
    pub fn flow(&self) -> MutexGuard<'_, AssessmentFlow> {
        self.flow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Leave a one-shot message for the next screen, e.g. the login form
    /// after verification.
    pub fn set_notice(&self, message: impl Into<String>) {
        *self.notice.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    pub fn take_notice(&self) -> Option<String> {
        self.notice
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

// Provided by the composition root (`crates/app`) via `with_context`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
