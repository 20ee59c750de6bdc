use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};
use navi_core::wizard::WizardStage;
use services::{AuthEvent, FlowRoute};
use tokio::sync::broadcast::error::RecvError;

use crate::context::AppContext;
use crate::views::{
    AssessmentHomeView, ForgotPasswordView, LandingView, LoginView, NotFoundView,
    ObjectiveQuestionsView, PersonalQuestionsView, ResetPasswordView, ResultsView, SignupView,
    VerifyView,
};

#[derive(Clone, Debug, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/", LandingView)] Landing {},
        #[route("/login", LoginView)] Login {},
        #[route("/signup", SignupView)] Signup {},
        #[route("/verify?:email", VerifyView)] Verify { email: String },
        #[route("/forgot-password", ForgotPasswordView)] ForgotPassword {},
        #[route("/reset-password?:token", ResetPasswordView)] ResetPassword { token: String },
        #[layout(Protected)]
            #[route("/assessment", AssessmentHomeView)] Assessment {},
            #[route("/assessment/personal", PersonalQuestionsView)] PersonalQuestions {},
            #[route("/assessment/objective", ObjectiveQuestionsView)] ObjectiveQuestions {},
            #[route("/results", ResultsView)] Results {},
        #[end_layout]
    #[end_layout]
    #[route("/:..segments", NotFoundView)] NotFound { segments: Vec<String> },
}

impl From<FlowRoute> for Route {
    fn from(route: FlowRoute) -> Self {
        match route {
            FlowRoute::Home => Route::Assessment {},
            FlowRoute::Questions(WizardStage::Personal) => Route::PersonalQuestions {},
            FlowRoute::Questions(WizardStage::Objective) => Route::ObjectiveQuestions {},
            FlowRoute::Results => Route::Results {},
        }
    }
}

/// Header, session-expiry banner and the auth event listener.
#[component]
fn Shell() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut notice = use_signal(|| None::<String>);
    let mut auth_revision = use_signal(|| 0_u64);

    let auth = ctx.auth();
    use_future(move || {
        let mut events = auth.subscribe();
        async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionExpired { message }) => notice.set(Some(message)),
                    Ok(AuthEvent::RedirectToLogin) => {
                        navigator.replace(Route::Login {});
                    }
                    Ok(AuthEvent::SignedIn) => {
                        notice.set(None);
                        *auth_revision.write() += 1;
                    }
                    Ok(AuthEvent::SignedOut) => *auth_revision.write() += 1,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "auth events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });

    let _ = auth_revision();
    let snapshot = ctx.auth().snapshot();
    let display_name = snapshot
        .user
        .as_ref()
        .map(navi_core::auth::AuthUser::display_name)
        .unwrap_or_default();
    let auth_flow = ctx.auth_flow();

    rsx! {
        div { class: "app",
            header { class: "topbar",
                Link { class: "brand", to: Route::Landing {}, "Navi" }
                if snapshot.is_authenticated() {
                    nav { class: "topbar-nav",
                        Link { to: Route::Assessment {}, "Assessment" }
                        span { class: "avatar", title: "{display_name}", "{snapshot.initials()}" }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: move |_| {
                                let auth_flow = auth_flow.clone();
                                spawn(async move {
                                    if let Err(err) = auth_flow.logout().await {
                                        tracing::warn!(error = %err, "logout failed");
                                    }
                                    navigator.push(Route::Login {});
                                });
                            },
                            "Log out"
                        }
                    }
                } else {
                    nav { class: "topbar-nav",
                        Link { to: Route::Login {}, "Sign in" }
                        Link { class: "btn btn-primary", to: Route::Signup {}, "Get started" }
                    }
                }
            }
            if let Some(message) = notice() {
                div { class: "status status-error session-notice", "{message}" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

/// Sends signed-out users to the login screen.
#[component]
fn Protected() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let authenticated = ctx.auth().is_authenticated();

    use_effect(move || {
        if !authenticated {
            navigator.replace(Route::Login {});
        }
    });

    if authenticated {
        rsx! { Outlet::<Route> {} }
    } else {
        rsx! {
            p { class: "muted", "Redirecting to sign in..." }
        }
    }
}
