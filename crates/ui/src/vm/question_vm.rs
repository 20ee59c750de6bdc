use navi_core::model::{QuestionOption, ResponseValue};
use navi_core::wizard::{StatusKind, StatusMessage, Wizard, WizardPhase};

use crate::vm::time_fmt::format_clock_time;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerInput {
    /// Free text; `value` is what the field should show.
    Text { value: String },
    Single,
    /// `limit` is the selection cap, if any.
    Multiple { limit: Option<u32> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionVm {
    pub option: QuestionOption,
    pub label: String,
    pub selected: bool,
}

/// The card for the question currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionCardVm {
    pub id: navi_core::model::QuestionId,
    pub text: String,
    pub input: AnswerInput,
    pub options: Vec<OptionVm>,
    pub error: Option<String>,
    pub position: String,
    pub percentage: u8,
    pub answered: String,
    pub can_go_back: bool,
    pub is_last: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusVm {
    pub class: &'static str,
    pub text: String,
}

#[must_use]
pub fn map_question_card(wizard: &Wizard) -> Option<QuestionCardVm> {
    let question = wizard.current_question()?;
    let response = wizard.response(question.id());
    let total = wizard.questions().len();
    let index = wizard.current_index();

    let input = if question.renders_as_text() {
        AnswerInput::Text {
            value: response.map(ResponseValue::as_text).unwrap_or_default().to_string(),
        }
    } else if question.is_multi_select() {
        AnswerInput::Multiple {
            limit: question.max_selections(),
        }
    } else {
        AnswerInput::Single
    };
    let options = if question.renders_as_text() {
        Vec::new()
    } else {
        question
            .options()
            .iter()
            .map(|option| OptionVm {
                option: option.clone(),
                label: option.text().to_string(),
                selected: response.is_some_and(|value| value.includes(option)),
            })
            .collect()
    };

    Some(QuestionCardVm {
        id: question.id().clone(),
        text: question.text().to_string(),
        input,
        options,
        error: wizard.error(question.id()).map(|err| err.to_string()),
        position: format!("Question {} of {}", index + 1, total),
        percentage: wizard.progress_percentage(),
        answered: format!("{} of {} answered", wizard.answered_count(), total),
        can_go_back: index > 0,
        is_last: wizard.is_last_question(),
    })
}

#[must_use]
pub fn map_status(status: &StatusMessage) -> StatusVm {
    let class = match status.kind {
        StatusKind::Info => "status status-info",
        StatusKind::Success => "status status-success",
        StatusKind::Error => "status status-error",
    };
    let text = match status.saved_at {
        Some(at) => format!("{} ({})", status.text, format_clock_time(at)),
        None => status.text.clone(),
    };
    StatusVm { class, text }
}

#[must_use]
pub fn submit_label(wizard: &Wizard) -> &'static str {
    match wizard.phase() {
        WizardPhase::Submitting => "Submitting...",
        WizardPhase::Submitted => "Submitted",
        _ => "Submit",
    }
}
