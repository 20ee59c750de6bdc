use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::QuestionId;

/// How a question expects to be answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    OpenEnded,
    SingleChoice,
    MultipleChoice,
}

impl InputType {
    /// Interpret the backend's `inputType` string.
    ///
    /// Unknown or missing values fall back to single-choice when options are
    /// present and open-ended otherwise.
    #[must_use]
    pub fn parse_loose(raw: Option<&str>, has_options: bool) -> Self {
        let normalized = raw
            .map(|value| value.trim().to_ascii_lowercase().replace('-', "_"))
            .unwrap_or_default();
        match normalized.as_str() {
            "multiple_choice" | "multi_select" | "checkbox" => InputType::MultipleChoice,
            "single_choice" | "radio" | "select" => InputType::SingleChoice,
            "open_ended" | "text" | "textarea" => InputType::OpenEnded,
            _ if has_options => InputType::SingleChoice,
            _ => InputType::OpenEnded,
        }
    }

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            InputType::OpenEnded => "open_ended",
            InputType::SingleChoice => "single_choice",
            InputType::MultipleChoice => "multiple_choice",
        }
    }
}

/// A selectable option: either a bare label or a label tagged with traits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOption {
    Text(String),
    Tagged {
        text: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        traits: Value,
    },
}

impl QuestionOption {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            QuestionOption::Text(text) | QuestionOption::Tagged { text, .. } => text,
        }
    }

    /// Options compare by their label, whichever shape they arrived in.
    #[must_use]
    pub fn same_choice(&self, other: &QuestionOption) -> bool {
        self.text() == other.text()
    }

    fn to_value(&self) -> Value {
        match self {
            QuestionOption::Text(text) => Value::String(text.clone()),
            QuestionOption::Tagged { text, traits } => {
                let mut map = serde_json::Map::new();
                map.insert("text".into(), Value::String(text.clone()));
                if !traits.is_null() {
                    map.insert("traits".into(), traits.clone());
                }
                Value::Object(map)
            }
        }
    }
}

impl From<&str> for QuestionOption {
    fn from(value: &str) -> Self {
        QuestionOption::Text(value.to_string())
    }
}

/// One assessment question, immutable once fetched for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireQuestion", into = "WireQuestion")]
pub struct Question {
    id: QuestionId,
    text: String,
    input_type: InputType,
    options: Vec<QuestionOption>,
    max_selections: Option<u32>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        input_type: InputType,
        options: Vec<QuestionOption>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            input_type,
            options,
            max_selections: None,
        }
    }

    #[must_use]
    pub fn with_max_selections(mut self, max: u32) -> Self {
        self.max_selections = Some(max);
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn max_selections(&self) -> Option<u32> {
        self.max_selections
    }

    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.input_type == InputType::MultipleChoice
    }

    /// Questions without options are answered in a free text field.
    #[must_use]
    pub fn renders_as_text(&self) -> bool {
        self.options.is_empty() || self.input_type == InputType::OpenEnded
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    id: QuestionId,
    #[serde(default, alias = "question", alias = "text")]
    question_text: String,
    #[serde(default)]
    input_type: Option<String>,
    #[serde(default)]
    options: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_selections: Option<u32>,
}

impl From<WireQuestion> for Question {
    fn from(wire: WireQuestion) -> Self {
        let options = parse_options(wire.options);
        let input_type = InputType::parse_loose(wire.input_type.as_deref(), !options.is_empty());
        Self {
            id: wire.id,
            text: wire.question_text,
            input_type,
            options,
            max_selections: wire.max_selections.filter(|max| *max > 0),
        }
    }
}

impl From<Question> for WireQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question_text: question.text,
            input_type: Some(question.input_type.as_wire().to_string()),
            options: Value::Array(question.options.iter().map(QuestionOption::to_value).collect()),
            max_selections: question.max_selections,
        }
    }
}

/// Normalize the `options` field, which the backend sends as an array, a
/// JSON-encoded array, or a comma separated string.
#[must_use]
pub fn parse_options(raw: Value) -> Vec<QuestionOption> {
    match raw {
        Value::Array(items) => items.into_iter().filter_map(option_from_value).collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => {
                    items.into_iter().filter_map(option_from_value).collect()
                }
                _ => trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(QuestionOption::from)
                    .collect(),
            }
        }
        _ => Vec::new(),
    }
}

fn option_from_value(value: Value) -> Option<QuestionOption> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(QuestionOption::Text(text.trim().to_string())),
        Value::Object(mut map) => {
            let text = match map.remove("text") {
                Some(Value::String(text)) => text,
                Some(other) if !other.is_null() => other.to_string(),
                _ => return None,
            };
            let traits = map.remove("traits").unwrap_or(Value::Null);
            Some(QuestionOption::Tagged { text, traits })
        }
        other => Some(QuestionOption::Text(other.to_string())),
    }
}
