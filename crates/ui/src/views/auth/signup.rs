use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::api::SignupRequest;

use super::FormFeedback;
use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn SignupView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut first_name = use_signal(String::new);
    let mut last_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut feedback = use_signal(FormFeedback::default);
    let mut pending = use_signal(|| false);

    let auth_flow = ctx.auth_flow();
    let submit = move |_: MouseEvent| {
        if pending() {
            return;
        }
        let auth_flow = auth_flow.clone();
        let request = SignupRequest {
            first_name: first_name.peek().clone(),
            last_name: last_name.peek().clone(),
            email: email.peek().clone(),
            password: password.peek().clone(),
        };
        pending.set(true);
        spawn(async move {
            let result = auth_flow.signup(request).await;
            pending.set(false);
            match result {
                Ok(outcome) => {
                    navigator.push(Route::Verify {
                        email: outcome.email,
                    });
                }
                Err(err) => feedback.set(FormFeedback::from_error(&err)),
            }
        });
    };

    let current = feedback();
    rsx! {
        div { class: "page auth-page",
            h2 { class: "view-title", "Create your account" }
            if let Some(banner) = current.banner.clone() {
                div { class: "status status-error", "{banner}" }
            }
            div { class: "field-row",
                label { class: "field",
                    span { "First name" }
                    input { value: "{first_name}", oninput: move |evt| first_name.set(evt.value()) }
                    if let Some(message) = current.field("firstName") {
                        span { class: "field-error", "{message}" }
                    }
                }
                label { class: "field",
                    span { "Last name" }
                    input { value: "{last_name}", oninput: move |evt| last_name.set(evt.value()) }
                    if let Some(message) = current.field("lastName") {
                        span { class: "field-error", "{message}" }
                    }
                }
            }
            label { class: "field",
                span { "Email" }
                input { r#type: "email", value: "{email}", oninput: move |evt| email.set(evt.value()) }
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
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: pending(),
                onclick: submit,
                if pending() { "Creating account..." } else { "Sign up" }
            }
            div { class: "auth-links",
                span { "Already have an account? " }
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
