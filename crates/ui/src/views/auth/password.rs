use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::ResetOutcome;

use super::FormFeedback;
use crate::context::AppContext;
use crate::routes::Route;

/// Pause before leaving the reset screen so the success banner is seen.
const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[component]
pub fn ForgotPasswordView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_hook(|| ctx.take_notice());
    let mut email = use_signal(String::new);
    let mut feedback = use_signal(FormFeedback::default);
    let mut sent = use_signal(|| None::<String>);
    let mut pending = use_signal(|| false);

    let auth_flow = ctx.auth_flow();
    let submit = move |_: MouseEvent| {
        if pending() {
            return;
        }
        let auth_flow = auth_flow.clone();
        pending.set(true);
        spawn(async move {
            let result = auth_flow.forgot_password(&email.peek()).await;
            pending.set(false);
            match result {
                Ok(message) => {
                    feedback.set(FormFeedback::default());
                    sent.set(Some(message));
                }
                Err(err) => feedback.set(FormFeedback::from_error(&err)),
            }
        });
    };

    let current = feedback();
    rsx! {
        div { class: "page auth-page",
            h2 { class: "view-title", "Forgot your password?" }
            p { class: "view-subtitle", "We'll email you a link to choose a new one." }
            if let Some(message) = notice {
                div { class: "status status-error", "{message}" }
            }
            if let Some(message) = sent() {
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
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: pending(),
                onclick: submit,
                if pending() { "Sending..." } else { "Send reset link" }
            }
            div { class: "auth-links",
                Link { to: Route::Login {}, "Back to sign in" }
            }
        }
    }
}

#[component]
pub fn ResetPasswordView(token: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut feedback = use_signal(FormFeedback::default);
    let mut done = use_signal(|| None::<String>);
    let mut pending = use_signal(|| false);
    let token = use_signal(|| Some(token).filter(|token| !token.trim().is_empty()));

    let auth_flow = ctx.auth_flow();
    let notice_ctx = ctx.clone();
    let submit = move |_: MouseEvent| {
        if pending() || done.peek().is_some() {
            return;
        }
        let auth_flow = auth_flow.clone();
        let ctx = notice_ctx.clone();
        pending.set(true);
        spawn(async move {
            let token = token.peek().clone();
            let result = auth_flow
                .reset_password(token.as_deref(), &password.peek(), &confirm.peek())
                .await;
            pending.set(false);
            match result {
                Ok(ResetOutcome::Done { message }) => {
                    feedback.set(FormFeedback::default());
                    ctx.set_notice(message.clone());
                    done.set(Some(message));
                    tokio::time::sleep(REDIRECT_DELAY).await;
                    navigator.push(Route::Login {});
                }
                Ok(ResetOutcome::LinkExpired { message }) => {
                    ctx.set_notice(message);
                    navigator.push(Route::ForgotPassword {});
                }
                Err(err) => feedback.set(FormFeedback::from_error(&err)),
            }
        });
    };

    let current = feedback();
    rsx! {
        div { class: "page auth-page",
            h2 { class: "view-title", "Choose a new password" }
            if token.read().is_none() {
                div { class: "status status-error",
                    "This reset link is incomplete. "
                    Link { to: Route::ForgotPassword {}, "Request a new one" }
                }
            }
            if let Some(message) = done() {
                div { class: "status status-success", "{message}" }
            }
            if let Some(banner) = current.banner.clone() {
                div { class: "status status-error", "{banner}" }
            }
            label { class: "field",
                span { "New password" }
                input {
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(message) = current.field("password") {
                    span { class: "field-error", "{message}" }
                }
            }
            label { class: "field",
                span { "Confirm password" }
                input {
                    r#type: "password",
                    value: "{confirm}",
                    oninput: move |evt| confirm.set(evt.value()),
                }
                if let Some(message) = current.field("confirmPassword") {
                    span { class: "field-error", "{message}" }
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: pending() || done().is_some(),
                onclick: submit,
                if pending() { "Resetting..." } else { "Reset password" }
            }
            div { class: "auth-links",
                Link { to: Route::Login {}, "Back to sign in" }
            }
        }
    }
}
