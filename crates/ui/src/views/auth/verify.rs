use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use navi_core::verification::{CODE_LENGTH, CODE_TTL_SECS, VerificationCode, format_countdown};
use services::{AuthFlowError, VerifyOutcome};

use crate::context::AppContext;
use crate::routes::Route;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Banner {
    Success(String),
    Error(String),
}

#[component]
pub fn VerifyView(email: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut code = use_signal(VerificationCode::new);
    let mut seconds_left = use_signal(|| CODE_TTL_SECS);
    let mut can_resend = use_signal(|| false);
    let mut banner = use_signal(|| None::<Banner>);
    let mut pending = use_signal(|| false);
    let mut target = use_signal(|| email.trim().to_string());
    let mut tick = use_signal(|| 0_u64);

    let auth_flow = ctx.auth_flow();
    use_future(move || {
        let auth_flow = auth_flow.clone();
        async move {
            if target.peek().is_empty() {
                match auth_flow.pending_verification().await {
                    Ok(Some(record)) => target.set(record.email),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "could not read pending signup"),
                }
            }
            let email = target.peek().clone();
            if email.is_empty() {
                return;
            }
            match auth_flow.verification_timer(&email).await {
                Ok(timer) => {
                    seconds_left.set(timer.seconds_left);
                    can_resend.set(timer.can_resend);
                }
                Err(err) => tracing::warn!(error = %err, "could not read code deadline"),
            }
        }
    });

    use_future(move || async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            *tick.write() += 1;
            let left = *seconds_left.peek();
            if left > 1 {
                seconds_left.set(left - 1);
            } else if left == 1 {
                seconds_left.set(0);
                can_resend.set(true);
            }
        }
    });

    let auth_flow = ctx.auth_flow();
    let auth_flow_for_resend = auth_flow.clone();
    let notice_ctx = ctx.clone();
    let verify = move |_: MouseEvent| {
        if pending() {
            return;
        }
        let auth_flow = auth_flow.clone();
        let ctx = notice_ctx.clone();
        pending.set(true);
        spawn(async move {
            let email = target.peek().clone();
            let entered = code.peek().clone();
            let result = auth_flow.verify(&email, &entered).await;
            pending.set(false);
            match result {
                Ok(VerifyOutcome::Verified { message } | VerifyOutcome::AlreadyVerified { message }) => {
                    ctx.set_notice(message);
                    navigator.push(Route::Login {});
                }
                Err(AuthFlowError::CodeExpired(message)) => {
                    seconds_left.set(0);
                    can_resend.set(true);
                    banner.set(Some(Banner::Error(message)));
                }
                Err(err @ AuthFlowError::IncompleteCode) => {
                    banner.set(Some(Banner::Error(err.to_string())));
                }
                Err(err) => {
                    code.write().clear();
                    banner.set(Some(Banner::Error(err.to_string())));
                }
            }
        });
    };

    let resend = move |_: MouseEvent| {
        let auth_flow = auth_flow_for_resend.clone();
        spawn(async move {
            let email = target.peek().clone();
            match auth_flow.resend(&email).await {
                Ok(message) => {
                    seconds_left.set(CODE_TTL_SECS);
                    can_resend.set(false);
                    code.write().clear();
                    banner.set(Some(Banner::Success(message.to_string())));
                }
                Err(err) => banner.set(Some(Banner::Error(err.to_string()))),
            }
        });
    };

    let _ = tick();
    let email_shown = target();
    let cooldown = ctx.auth_flow().resend_cooldown(&email_shown);
    let countdown = format_countdown(seconds_left());
    let slots: Vec<(usize, String)> = (0..CODE_LENGTH)
        .map(|index| {
            (
                index,
                code.read().slot(index).map(String::from).unwrap_or_default(),
            )
        })
        .collect();

    rsx! {
        div { class: "page auth-page",
            h2 { class: "view-title", "Verify your email" }
            p { class: "view-subtitle", "Enter the 5-digit code we sent to {email_shown}." }
            match banner() {
                Some(Banner::Success(message)) => rsx! {
                    div { class: "status status-success", "{message}" }
                },
                Some(Banner::Error(message)) => rsx! {
                    div { class: "status status-error", "{message}" }
                },
                None => rsx! {},
            }
            div { class: "code-inputs",
                for (index, digit) in slots {
                    input {
                        key: "{index}",
                        id: "code-{index}",
                        class: "code-slot",
                        inputmode: "numeric",
                        value: "{digit}",
                        oninput: move |evt| {
                            let next = code.write().input(index, &evt.value());
                            banner.set(None);
                            let _ = document::eval(&format!("document.getElementById('code-{next}')?.focus()"));
                        },
                    }
                }
            }
            if seconds_left() > 0 {
                p { class: "muted", "Code expires in {countdown}" }
            } else {
                p { class: "field-error", "Your code has expired. Request a new one." }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: pending() || !code.read().is_complete(),
                onclick: verify,
                if pending() { "Verifying..." } else { "Verify" }
            }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                disabled: !can_resend() || cooldown > 0,
                onclick: resend,
                if cooldown > 0 { "Resend code in {cooldown}s" } else { "Resend code" }
            }
            div { class: "auth-links",
                Link { to: Route::Login {}, "Back to sign in" }
            }
        }
    }
}
