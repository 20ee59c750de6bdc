use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::LoginOutcome;

use super::FormFeedback;
use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let notice = use_hook(|| ctx.take_notice());
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut remember_me = use_signal(|| false);
    let mut feedback = use_signal(FormFeedback::default);
    let mut pending = use_signal(|| false);

    let auth_flow = ctx.auth_flow();
    let submit = move |_: MouseEvent| {
        if pending() {
            return;
        }
        let auth_flow = auth_flow.clone();
        pending.set(true);
        spawn(async move {
            let result = auth_flow
                .login(&email.peek(), &password.peek(), *remember_me.peek())
                .await;
            pending.set(false);
            match result {
                Ok(LoginOutcome::SignedIn { .. }) => {
                    feedback.set(FormFeedback::default());
                    navigator.push(Route::Assessment {});
                }
                Ok(LoginOutcome::NeedsVerification { email, .. }) => {
                    navigator.push(Route::Verify { email });
                }
                Err(err) => feedback.set(FormFeedback::from_error(&err)),
            }
        });
    };

    let current = feedback();
    rsx! {
        div { class: "page auth-page",
            h2 { class: "view-title", "Welcome back" }
            if let Some(message) = notice {
                div { class: "status status-success", "{message}" }
            }
            if let Some(banner) = current.banner.clone() {
                div { class: "status status-error", "{banner}" }
            }
            label { class: "field",
                span { "Email" }
                input {
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                if let Some(message) = current.field("email") {
                    span { class: "field-error", "{message}" }
                }
            }
            label { class: "field",
                span { "Password" }
                input {
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(message) = current.field("password") {
                    span { class: "field-error", "{message}" }
                }
            }
            label { class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: remember_me(),
                    onchange: move |_| remember_me.toggle(),
                }
                span { "Remember me" }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: pending(),
                onclick: submit,
                if pending() { "Signing in..." } else { "Sign in" }
            }
            div { class: "auth-links",
                Link { to: Route::ForgotPassword {}, "Forgot password?" }
                Link { to: Route::Signup {}, "Create an account" }
            }
        }
    }
}
