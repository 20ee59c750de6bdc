use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AssessmentHomeVm, StepCardVm, map_assessment_home};

const MSG_LOAD_FAILED: &str = "Failed to load assessment progress. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Banner {
    Success(String),
    Error(String),
}

#[component]
pub fn AssessmentHomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut banner = use_signal(|| None::<Banner>);
    let mut retaking = use_signal(|| false);

    let home = ctx.home();
    let flow_ctx = ctx.clone();
    let mut resource = use_resource(move || {
        let home = home.clone();
        let ctx = flow_ctx.clone();
        async move {
            let overview = home
                .load()
                .await
                .map_err(|err| ViewError::from_api(&err, MSG_LOAD_FAILED))?;
            ctx.flow().sync_from_overview(&overview);
            Ok::<_, ViewError>(map_assessment_home(&overview))
        }
    });

    let retake_ctx = ctx.clone();
    let retake = move |_: MouseEvent| {
        if retaking() {
            return;
        }
        let ctx = retake_ctx.clone();
        retaking.set(true);
        spawn(async move {
            let result = ctx.home().retake().await;
            retaking.set(false);
            match result {
                Ok(message) => {
                    ctx.flow().retake();
                    ctx.results().clear();
                    banner.set(Some(Banner::Success(message.to_string())));
                    resource.restart();
                }
                Err(err) => banner.set(Some(Banner::Error(err.user_message()))),
            }
        });
    };

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { class: "view-title", "Your career assessment" }
            p { class: "view-subtitle",
                "Three short steps to find careers that fit who you are."
            }
            match banner() {
                Some(Banner::Success(message)) => rsx! {
                    div { class: "status status-success", "{message}" }
                },
                Some(Banner::Error(message)) => rsx! {
                    div { class: "status status-error", "{message}" }
                },
                None => rsx! {},
            }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "muted", "Loading your progress..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "status status-error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
                ViewState::Ready(vm) => {
                    let AssessmentHomeVm { steps, button_label, entry, can_view_results, message } = vm;
                    rsx! {
                        if let Some(message) = message {
                            p { class: "muted", "{message}" }
                        }
                        ol { class: "steps",
                            for step in steps {
                                StepCard { key: "{step.number}", step }
                            }
                        }
                        div { class: "actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| {
                                    navigator.push(Route::from(entry));
                                },
                                "{button_label}"
                            }
                            if can_view_results {
                                button {
                                    class: "btn btn-secondary",
                                    r#type: "button",
                                    disabled: retaking(),
                                    onclick: retake,
                                    if retaking() { "Resetting..." } else { "Retake assessment" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StepCard(step: StepCardVm) -> Element {
    rsx! {
        li { class: "{step.status_class}",
            div { class: "step-header",
                span { class: "step-number", "{step.number}" }
                h3 { "{step.title}" }
                span { class: "step-badge", "{step.status_label}" }
            }
            p { "{step.description}" }
            div { class: "step-meta",
                span { "{step.estimated}" }
                if let Some(counts) = step.counts {
                    span { "{counts}" }
                }
            }
        }
    }
}
