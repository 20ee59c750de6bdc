use dioxus::prelude::*;
use dioxus_router::use_navigator;

use navi_core::model::{QuestionId, ResponseValue};
use navi_core::wizard::{ResponseEdit, WizardPhase, WizardStage};
use services::{InitOutcome, SubmitOutcome, WizardController};

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::{
    AnswerInput, OptionVm, QuestionCardVm, StatusVm, map_question_card, map_status, submit_label,
};

/// Everything the question screen renders, read in one lock.
#[derive(Clone, Debug, PartialEq)]
struct ScreenVm {
    title: &'static str,
    phase: WizardPhase,
    card: Option<QuestionCardVm>,
    status: Option<StatusVm>,
    submit_label: &'static str,
    busy: bool,
    submitting: bool,
    saving: bool,
    reset_requested: bool,
    keeps_drafts: bool,
}

fn read_screen(controller: &WizardController) -> ScreenVm {
    controller.read(|wizard| ScreenVm {
        title: wizard.stage().title(),
        phase: wizard.phase(),
        card: map_question_card(wizard),
        status: wizard.status().map(map_status),
        submit_label: submit_label(wizard),
        busy: wizard.is_busy(),
        submitting: wizard.is_submitting(),
        saving: wizard.is_saving(),
        reset_requested: wizard.reset_requested(),
        keeps_drafts: wizard.stage().save_step().is_some(),
    })
}

/// Load the stage and start autosave once questions are in.
async fn start(controller: WizardController, ctx: AppContext, stage: WizardStage) {
    let handoff = match stage {
        WizardStage::Objective => ctx.flow().take_handoff(),
        WizardStage::Personal => None,
    };
    match controller.initialize(handoff).await {
        InitOutcome::Failed | InitOutcome::AlreadyInitialized => {}
        outcome => {
            tracing::debug!(?outcome, ?stage, "questions ready");
            controller.start_autosave();
        }
    }
}

fn record(controller: &WizardController, id: &QuestionId, edit: ResponseEdit) {
    if let Err(err) = controller.record_response(id, edit) {
        tracing::debug!(error = %err, question = %id, "response ignored");
    }
}

#[component]
pub fn PersonalQuestionsView() -> Element {
    rsx! {
        QuestionsView { stage: WizardStage::Personal }
    }
}

#[component]
pub fn ObjectiveQuestionsView() -> Element {
    rsx! {
        QuestionsView { stage: WizardStage::Objective }
    }
}

#[component]
pub fn QuestionsView(stage: WizardStage) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let hook_ctx = ctx.clone();
    let controller = use_hook(move || hook_ctx.wizard(stage));
    let mut revision = use_signal(|| 0_u64);

    let watched = controller.clone();
    use_future(move || {
        let mut changes = watched.subscribe();
        async move {
            while changes.changed().await.is_ok() {
                let version = *changes.borrow_and_update();
                revision.set(version);
            }
        }
    });

    let starting = controller.clone();
    let start_ctx = ctx.clone();
    use_future(move || {
        start(starting.clone(), start_ctx.clone(), stage)
    });

    let stopping = controller.clone();
    use_drop(move || stopping.stop_autosave());

    let _ = revision();
    let screen = read_screen(&controller);

    let next = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            spawn(async move {
                if let Err(err) = controller.advance().await {
                    tracing::debug!(error = %err, "question left unanswered");
                }
            });
        }
    };
    let retry = {
        let controller = controller.clone();
        let ctx = ctx.clone();
        move |_: MouseEvent| {
            spawn(start(controller.clone(), ctx.clone(), stage));
        }
    };
    let back = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            controller.retreat();
        }
    };
    let save = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            spawn(async move {
                controller.save(true).await;
            });
        }
    };
    let submit = {
        let controller = controller.clone();
        let ctx = ctx.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            let ctx = ctx.clone();
            spawn(async move {
                let outcome = controller.submit().await;
                if let SubmitOutcome::Rejected(err) = &outcome {
                    tracing::debug!(error = %err, "submission blocked");
                }
                let route = ctx.flow().apply(&outcome);
                if let Some(route) = route {
                    navigator.push(Route::from(route));
                }
            });
        }
    };
    let request_reset = {
        let controller = controller.clone();
        move |_: MouseEvent| controller.request_reset()
    };
    let cancel_reset = {
        let controller = controller.clone();
        move |_: MouseEvent| controller.cancel_reset()
    };
    let confirm_reset = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            spawn(async move {
                if let Err(err) = controller.confirm_reset().await {
                    tracing::debug!(error = %err, "reset did not complete");
                }
            });
        }
    };

    rsx! {
        div { class: "page questions-page",
            h2 { class: "view-title", "{screen.title}" }
            if let Some(status) = screen.status.clone() {
                div { class: "{status.class}", "{status.text}" }
            }
            match screen.card.clone() {
                None if screen.phase == WizardPhase::Loading => rsx! {
                    p { class: "muted", "Loading questions..." }
                },
                None => rsx! {
                    p { class: "muted", "No questions are available right now." }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: retry,
                        "Try again"
                    }
                },
                Some(card) => rsx! {
                    div { class: "progress",
                        div { class: "progress-bar", style: "width: {card.percentage}%" }
                    }
                    div { class: "progress-meta",
                        span { "{card.position}" }
                        span { "{card.answered}" }
                    }
                    QuestionCard { card: card.clone(), controller: controller.clone() }
                    div { class: "actions",
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            disabled: !card.can_go_back || screen.submitting,
                            onclick: back,
                            "Previous"
                        }
                        if screen.keeps_drafts {
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                disabled: screen.busy,
                                onclick: save,
                                if screen.saving { "Saving..." } else { "Save progress" }
                            }
                        }
                        if card.is_last {
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                disabled: screen.busy || screen.phase == WizardPhase::Submitted,
                                onclick: submit,
                                "{screen.submit_label}"
                            }
                        } else {
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                disabled: screen.submitting,
                                onclick: next,
                                "Next"
                            }
                        }
                    }
                    button {
                        class: "btn btn-link",
                        r#type: "button",
                        disabled: screen.busy,
                        onclick: request_reset,
                        "Start over"
                    }
                },
            }
            if screen.reset_requested {
                div { class: "dialog-backdrop",
                    div { class: "dialog", role: "dialog",
                        h3 { "Start over?" }
                        p { "This clears every answer in this section. It cannot be undone." }
                        div { class: "actions",
                            button {
                                class: "btn btn-ghost",
                                r#type: "button",
                                onclick: cancel_reset,
                                "Cancel"
                            }
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: confirm_reset,
                                "Clear answers"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Clone, Props)]
struct QuestionCardProps {
    card: QuestionCardVm,
    controller: WizardController,
}

impl PartialEq for QuestionCardProps {
    fn eq(&self, other: &Self) -> bool {
        self.card == other.card
    }
}

#[allow(non_snake_case)]
fn QuestionCard(props: QuestionCardProps) -> Element {
    let QuestionCardProps { card, controller } = props;
    let id = card.id.clone();

    let body = match card.input.clone() {
        AnswerInput::Text { value } => {
            let controller = controller.clone();
            rsx! {
                textarea {
                    class: "answer-text",
                    rows: "5",
                    value: "{value}",
                    oninput: move |evt| {
                        record(&controller, &id, ResponseEdit::Replace(ResponseValue::Text(evt.value())));
                    },
                }
            }
        }
        AnswerInput::Single => rsx! {
            div { class: "options",
                for option in card.options.clone() {
                    OptionButton {
                        key: "{option.label}",
                        option: option.clone(),
                        multiple: false,
                        controller: controller.clone(),
                        question: id.clone(),
                    }
                }
            }
        },
        AnswerInput::Multiple { limit } => rsx! {
            if let Some(limit) = limit {
                p { class: "muted", "Choose up to {limit}." }
            } else {
                p { class: "muted", "Choose all that apply." }
            }
            div { class: "options",
                for option in card.options.clone() {
                    OptionButton {
                        key: "{option.label}",
                        option: option.clone(),
                        multiple: true,
                        controller: controller.clone(),
                        question: id.clone(),
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "question-card",
            p { class: "question-text", "{card.text}" }
            {body}
            if let Some(error) = card.error.clone() {
                span { class: "field-error", "{error}" }
            }
        }
    }
}

#[derive(Clone, Props)]
struct OptionButtonProps {
    option: OptionVm,
    multiple: bool,
    controller: WizardController,
    question: QuestionId,
}

impl PartialEq for OptionButtonProps {
    fn eq(&self, other: &Self) -> bool {
        self.option == other.option
            && self.multiple == other.multiple
            && self.question == other.question
    }
}

#[allow(non_snake_case)]
fn OptionButton(props: OptionButtonProps) -> Element {
    let OptionButtonProps {
        option,
        multiple,
        controller,
        question,
    } = props;
    let class = if option.selected {
        "option option-selected"
    } else {
        "option"
    };
    let choice = option.option.clone();

    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            "aria-pressed": "{option.selected}",
            onclick: move |_| {
                let edit = if multiple {
                    ResponseEdit::Toggle(choice.clone())
                } else {
                    ResponseEdit::Replace(ResponseValue::from_option(&choice))
                };
                record(&controller, &question, edit);
            },
            "{option.label}"
        }
    }
}
