use dioxus::prelude::*;
use dioxus_router::use_navigator;

use navi_core::model::CareerId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CareerCardVm, ResultsVm, map_results};

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut revision = use_signal(|| 0_u64);
    let mut retake_error = use_signal(|| None::<String>);
    let mut retaking = use_signal(|| false);

    let load_ctx = ctx.clone();
    let mut resource = use_resource(move || {
        let ctx = load_ctx.clone();
        async move {
            let home = ctx.home();
            if !home.can_view_results().await {
                return Ok::<_, ViewError>(false);
            }
            let known = ctx.flow().results_session().cloned();
            let session_id = match known {
                Some(session_id) => Some(session_id),
                None => match home.load().await {
                    Ok(overview) => {
                        ctx.flow().sync_from_overview(&overview);
                        Some(overview.session_id().clone())
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "could not look up the results session");
                        None
                    }
                },
            };
            ctx.results().load(session_id.as_ref()).await?;
            Ok(true)
        }
    });

    use_effect(move || {
        if matches!(&*resource.value().read(), Some(Ok(false))) {
            navigator.replace(Route::Assessment {});
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
                Ok(_) => {
                    ctx.flow().retake();
                    ctx.results().clear();
                    navigator.push(Route::Assessment {});
                }
                Err(err) => retake_error.set(Some(err.user_message())),
            }
        });
    };

    let _ = revision();
    let board = ctx.results().read(|board| board.map(map_results));
    let state = view_state_from_resource(&resource);
    let presenter = ctx.results();

    rsx! {
        div { class: "page results-page",
            h2 { class: "view-title", "Your career matches" }
            if let Some(message) = retake_error() {
                div { class: "status status-error", "{message}" }
            }
            match (state, board) {
                (ViewState::Error(err), _) => rsx! {
                    div { class: "status status-error", "{err.message()}" }
                    div { class: "actions",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| resource.restart(),
                            "Try again"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| {
                                navigator.push(Route::Assessment {});
                            },
                            "Back to assessment"
                        }
                    }
                },
                (ViewState::Ready(true), Some(vm)) => rsx! {
                    ResultsBody {
                        vm,
                        on_toggle: move |career_id: CareerId| {
                            let presenter = presenter.clone();
                            spawn(async move {
                                presenter.toggle_details(&career_id).await;
                                *revision.write() += 1;
                            });
                        },
                    }
                    div { class: "actions",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: retaking(),
                            onclick: retake,
                            if retaking() { "Resetting..." } else { "Retake assessment" }
                        }
                    }
                },
                _ => rsx! {
                    p { class: "muted", "Loading your results..." }
                },
            }
        }
    }
}

#[component]
fn ResultsBody(vm: ResultsVm, on_toggle: EventHandler<CareerId>) -> Element {
    rsx! {
        if !vm.summary.is_empty() {
            p { class: "results-summary", "{vm.summary}" }
        }
        if let Some(title) = vm.top_match.clone() {
            p { class: "top-match", "Top match: {title}" }
        }
        div { class: "traits",
            if !vm.strengths.is_empty() {
                div {
                    h3 { "Strengths" }
                    ul {
                        for strength in vm.strengths.clone() {
                            li { "{strength}" }
                        }
                    }
                }
            }
            if !vm.development_areas.is_empty() {
                div {
                    h3 { "Areas to develop" }
                    ul {
                        for area in vm.development_areas.clone() {
                            li { "{area}" }
                        }
                    }
                }
            }
        }
        if vm.careers.is_empty() {
            p { class: "muted", "No career matches yet." }
        }
        div { class: "careers",
            for career in vm.careers.clone() {
                CareerCard { key: "{career.id}", career, on_toggle }
            }
        }
    }
}

#[component]
fn CareerCard(career: CareerCardVm, on_toggle: EventHandler<CareerId>) -> Element {
    let id = career.id.clone();
    let toggle_label = if career.expanded { "Hide details" } else { "View details" };

    rsx! {
        article { class: "career-card",
            div { class: "career-header",
                h3 { "{career.title}" }
                span { class: "{career.match_class}", "{career.score} · {career.match_label}" }
            }
            p { "{career.description}" }
            dl { class: "career-facts",
                dt { "Sector" }
                dd { "{career.sector}" }
                dt { "Salary" }
                dd { "{career.salary}" }
                dt { "Growth" }
                dd { "{career.growth}" }
            }
            button {
                class: "btn btn-link",
                r#type: "button",
                onclick: move |_| on_toggle.call(id.clone()),
                "{toggle_label}"
            }
            if career.expanded {
                div { class: "career-details",
                    dl { class: "career-facts",
                        dt { "Location" }
                        dd { "{career.location}" }
                        dt { "Experience" }
                        dd { "{career.experience}" }
                        dt { "Education" }
                        dd { "{career.education}" }
                    }
                    if !career.skills.is_empty() {
                        h4 { "Key skills" }
                        ul {
                            for skill in career.skills.clone() {
                                li { "{skill}" }
                            }
                        }
                    }
                    if !career.reasoning.is_empty() {
                        h4 { "Why it fits" }
                        ul {
                            for reason in career.reasoning.clone() {
                                li { "{reason}" }
                            }
                        }
                    }
                    match career.advice.clone() {
                        Some(advice) => rsx! {
                            h4 { "Next steps" }
                            if !advice.summary.is_empty() {
                                p { "{advice.summary}" }
                            }
                            ul {
                                for step in advice.next_steps {
                                    li { "{step}" }
                                }
                            }
                            if !advice.resources.is_empty() {
                                h4 { "Resources" }
                                ul {
                                    for resource in advice.resources {
                                        li { "{resource}" }
                                    }
                                }
                            }
                        },
                        None => rsx! {
                            p { class: "muted", "Loading advice..." }
                        },
                    }
                }
            }
        }
    }
}
