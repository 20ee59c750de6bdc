use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use serde_json::Value;

use navi_core::auth::AuthUser;
use navi_core::model::{CareerId, Question, SessionId};
use navi_core::time::fixed_clock;
use navi_core::wizard::{DraftSnapshot, Submission, WizardStage};
use services::api::{
    Acknowledgement, AssessmentApi, AuthApi, CareerApi, LoginResponse, ObjectiveSubmitResponse,
    PersonalSubmitResponse, ProfileResponse, ProgressResponse, QuestionSet, ResumeResponse,
    SignupRequest,
};
use services::{ApiError, AppServices, AuthStore};
use storage::repository::Storage;

use crate::context::{AppContext, UiApp, build_app_context};
use crate::views::{
    AssessmentHomeView, LoginView, PersonalQuestionsView, ResultsView, VerifyView,
};

/// One fake backend answering every endpoint the views reach.
#[derive(Default)]
pub struct FakeBackend {
    pub resume: Mutex<Option<Value>>,
    pub questions: Mutex<Vec<Question>>,
    pub fail_questions: Mutex<bool>,
    pub recommendations: Mutex<Option<Value>>,
    pub retakes: Mutex<u32>,
}

impl FakeBackend {
    fn status(status: u16) -> ApiError {
        ApiError::Status {
            status,
            code: None,
            message: None,
        }
    }

    fn ok() -> Acknowledgement {
        Acknowledgement {
            success: true,
            message: None,
        }
    }
}

#[async_trait]
impl AssessmentApi for FakeBackend {
    async fn resume(&self) -> Result<ResumeResponse, ApiError> {
        let value = self
            .resume
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Self::status(500))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn progress(&self) -> Result<ProgressResponse, ApiError> {
        Ok(ProgressResponse::default())
    }

    async fn clear_progress(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn stage_questions(&self, _stage: WizardStage) -> Result<QuestionSet, ApiError> {
        if *self.fail_questions.lock().unwrap() {
            return Err(Self::status(503));
        }
        Ok(QuestionSet {
            questions: self.questions.lock().unwrap().clone(),
            session_id: SessionId::new("s-1"),
        })
    }

    async fn save_progress(&self, _draft: &DraftSnapshot) -> Result<(), ApiError> {
        Ok(())
    }

    async fn submit_personal(
        &self,
        _submission: &Submission,
    ) -> Result<PersonalSubmitResponse, ApiError> {
        Ok(PersonalSubmitResponse::default())
    }

    async fn submit_objective(
        &self,
        _submission: &Submission,
    ) -> Result<ObjectiveSubmitResponse, ApiError> {
        Ok(ObjectiveSubmitResponse::default())
    }

    async fn retake(&self) -> Result<Acknowledgement, ApiError> {
        *self.retakes.lock().unwrap() += 1;
        Ok(Self::ok())
    }
}

#[async_trait]
impl CareerApi for FakeBackend {
    async fn recommendations(&self, _session_id: &SessionId) -> Result<Value, ApiError> {
        self.recommendations
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Self::status(404))
    }

    async fn advice(&self, _career_id: &CareerId) -> Result<Value, ApiError> {
        Err(Self::status(500))
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn signup(&self, _request: &SignupRequest) -> Result<Acknowledgement, ApiError> {
        Ok(Self::ok())
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        Err(Self::status(401))
    }

    async fn verify_email(&self, _email: &str, _code: &str) -> Result<Acknowledgement, ApiError> {
        Ok(Self::ok())
    }

    async fn resend_verification(&self, _email: &str) -> Result<Acknowledgement, ApiError> {
        Ok(Self::ok())
    }

    async fn forgot_password(&self, _email: &str) -> Result<Acknowledgement, ApiError> {
        Ok(Self::ok())
    }

    async fn reset_password(
        &self,
        _token: &str,
        _password: &str,
    ) -> Result<Acknowledgement, ApiError> {
        Ok(Self::ok())
    }

    async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        Ok(ProfileResponse::default())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Verify(String),
    Home,
    Personal,
    Results,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    context: AppContext,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    use_context_provider(|| props.context.clone());
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Verify(email) => rsx! { VerifyView { email } },
        ViewKind::Home => rsx! { AssessmentHomeView {} },
        ViewKind::Personal => rsx! { PersonalQuestionsView {} },
        ViewKind::Results => rsx! { ResultsView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: Arc<FakeBackend>,
    pub context: AppContext,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..5 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Build a view over `backend`. A signed-in harness holds a token with no
/// expiry claim.
pub async fn setup_view_harness(
    view: ViewKind,
    backend: FakeBackend,
    signed_in: bool,
) -> ViewHarness {
    let clock = fixed_clock();
    let backend = Arc::new(backend);
    let auth = Arc::new(AuthStore::new(Storage::in_memory(), clock));
    if signed_in {
        let user = AuthUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..AuthUser::default()
        };
        auth.save_auth_token("eyJhbGciOiJub25lIn0.e30.sig", user, true)
            .await
            .expect("save token");
    }

    let services = AppServices::with_apis(
        clock,
        auth,
        Arc::clone(&backend) as Arc<dyn AssessmentApi>,
        Arc::clone(&backend) as Arc<dyn CareerApi>,
        Arc::clone(&backend) as Arc<dyn AuthApi>,
    );
    let app: Arc<dyn UiApp> = Arc::new(services);
    let context = build_app_context(app);

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            context: context.clone(),
            view,
        },
    );

    ViewHarness {
        dom,
        backend,
        context,
    }
}
