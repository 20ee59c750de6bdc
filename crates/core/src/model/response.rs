use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::question::{InputType, Question, QuestionOption};

/// A recorded answer for one question.
///
/// Saved drafts come back from the server in whatever shape they were
/// written, so anything that is not one of the known shapes is kept as
/// `Other` and judged by JavaScript-style truthiness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Text(String),
    Selections(Vec<QuestionOption>),
    Choice {
        text: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        traits: Value,
    },
    Other(Value),
}

impl Default for ResponseValue {
    fn default() -> Self {
        ResponseValue::Text(String::new())
    }
}

impl ResponseValue {
    /// The empty answer a freshly loaded question starts with.
    #[must_use]
    pub fn empty_for(question: &Question) -> Self {
        if question.is_multi_select() {
            ResponseValue::Selections(Vec::new())
        } else {
            ResponseValue::Text(String::new())
        }
    }

    /// Answer for picking a single option.
    #[must_use]
    pub fn from_option(option: &QuestionOption) -> Self {
        match option {
            QuestionOption::Text(text) => ResponseValue::Text(text.clone()),
            QuestionOption::Tagged { text, traits } => ResponseValue::Choice {
                text: text.clone(),
                traits: traits.clone(),
            },
        }
    }

    /// Whether the value counts as answered regardless of question type.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            ResponseValue::Text(text) => !text.trim().is_empty(),
            ResponseValue::Selections(items) => !items.is_empty(),
            ResponseValue::Choice { text, .. } => !text.is_empty(),
            ResponseValue::Other(value) => is_truthy(value),
        }
    }

    #[must_use]
    pub fn selections(&self) -> &[QuestionOption] {
        match self {
            ResponseValue::Selections(items) => items,
            _ => &[],
        }
    }

    /// Whether `option` is the current answer (single) or part of it (multi).
    #[must_use]
    pub fn includes(&self, option: &QuestionOption) -> bool {
        match self {
            ResponseValue::Text(text) => text == option.text(),
            ResponseValue::Choice { text, .. } => text == option.text(),
            ResponseValue::Selections(items) => items.iter().any(|item| item.same_choice(option)),
            ResponseValue::Other(_) => false,
        }
    }

    /// Text shown back in an open-ended field.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            ResponseValue::Text(text) | ResponseValue::Choice { text, .. } => text,
            _ => "",
        }
    }

    /// Wire form of an answer: strings pass through, structured values are
    /// JSON-encoded, null becomes the empty string.
    #[must_use]
    pub fn to_answer_string(&self) -> String {
        match self {
            ResponseValue::Text(text) => text.clone(),
            ResponseValue::Other(Value::Null) => String::new(),
            ResponseValue::Other(Value::String(text)) => text.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Per-question validation failure.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("This question is required")]
    Required,
    #[error("Please select at least one option")]
    SelectAtLeastOne,
}

/// Apply the type-specific answer rule for `question`.
///
/// # Errors
///
/// Returns `ValidationError::SelectAtLeastOne` for a multiple-choice question
/// without selections and `ValidationError::Required` for any other question
/// whose answer is blank.
pub fn validate_response(
    question: &Question,
    value: Option<&ResponseValue>,
) -> Result<(), ValidationError> {
    if question.input_type() == InputType::MultipleChoice {
        return match value {
            Some(ResponseValue::Selections(items)) if !items.is_empty() => Ok(()),
            _ => Err(ValidationError::SelectAtLeastOne),
        };
    }

    let valid = match value {
        None => false,
        Some(ResponseValue::Text(text)) => !text.trim().is_empty(),
        Some(ResponseValue::Choice { text, .. }) => !text.is_empty(),
        // A list is an object without a label for single answers.
        Some(ResponseValue::Selections(_)) => false,
        Some(ResponseValue::Other(Value::Object(map))) => {
            map.get("text").is_some_and(is_truthy)
        }
        Some(ResponseValue::Other(Value::Array(_))) => false,
        Some(ResponseValue::Other(other)) => is_truthy(other),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::Required)
    }
}

/// Toggle `option` in a multi-select answer.
///
/// Membership is decided by option label. Additions beyond `max_selections`
/// are ignored; removals always apply.
#[must_use]
pub fn toggle_selection(
    current: Option<&ResponseValue>,
    option: QuestionOption,
    max_selections: Option<u32>,
) -> ResponseValue {
    let mut items: Vec<QuestionOption> = current
        .map(|value| value.selections().to_vec())
        .unwrap_or_default();

    if let Some(position) = items.iter().position(|item| item.same_choice(&option)) {
        items.remove(position);
        return ResponseValue::Selections(items);
    }

    let at_cap = max_selections
        .and_then(|max| usize::try_from(max).ok())
        .is_some_and(|max| items.len() >= max);
    if !at_cap {
        items.push(option);
    }
    ResponseValue::Selections(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use serde_json::json;

    fn single() -> Question {
        Question::new(
            QuestionId::new("s"),
            "Single",
            InputType::SingleChoice,
            vec!["A".into(), "B".into()],
        )
    }

    fn multi() -> Question {
        Question::new(
            QuestionId::new("m"),
            "Multi",
            InputType::MultipleChoice,
            vec!["A".into(), "B".into(), "C".into()],
        )
    }

    #[test]
    fn blank_text_is_required() {
        let err = validate_response(&single(), Some(&ResponseValue::Text("   ".into())));
        assert_eq!(err, Err(ValidationError::Required));
        assert!(validate_response(&single(), Some(&ResponseValue::Text(" A ".into()))).is_ok());
    }

    #[test]
    fn choice_object_needs_label() {
        let empty = ResponseValue::Choice {
            text: String::new(),
            traits: Value::Null,
        };
        assert!(validate_response(&single(), Some(&empty)).is_err());
        let picked = ResponseValue::from_option(&QuestionOption::Tagged {
            text: "A".into(),
            traits: json!(["calm"]),
        });
        assert!(validate_response(&single(), Some(&picked)).is_ok());
    }

    #[test]
    fn multi_select_needs_a_selection() {
        let none = ResponseValue::Selections(Vec::new());
        assert_eq!(
            validate_response(&multi(), Some(&none)),
            Err(ValidationError::SelectAtLeastOne)
        );
        assert_eq!(
            validate_response(&multi(), Some(&ResponseValue::Text("A".into()))),
            Err(ValidationError::SelectAtLeastOne)
        );
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let start = ResponseValue::Selections(vec!["A".into()]);
        let once = toggle_selection(Some(&start), "B".into(), None);
        assert_eq!(once.selections().len(), 2);
        let twice = toggle_selection(Some(&once), "B".into(), None);
        assert_eq!(twice, start);
    }

    #[test]
    fn toggle_matches_tagged_and_plain_options_by_label() {
        let start = ResponseValue::Selections(vec![QuestionOption::Tagged {
            text: "A".into(),
            traits: json!({"openness": 2}),
        }]);
        let removed = toggle_selection(Some(&start), "A".into(), None);
        assert!(removed.selections().is_empty());
    }

    #[test]
    fn toggle_respects_max_selections() {
        let start = ResponseValue::Selections(vec!["A".into(), "B".into()]);
        let capped = toggle_selection(Some(&start), "C".into(), Some(2));
        assert_eq!(capped, start);
        let removed = toggle_selection(Some(&start), "A".into(), Some(2));
        assert_eq!(removed.selections().len(), 1);
    }

    #[test]
    fn answer_strings_encode_structured_values() {
        assert_eq!(ResponseValue::Text("hi".into()).to_answer_string(), "hi");
        assert_eq!(ResponseValue::Other(Value::Null).to_answer_string(), "");
        assert_eq!(
            ResponseValue::Selections(vec!["A".into(), "B".into()]).to_answer_string(),
            r#"["A","B"]"#
        );
        assert_eq!(ResponseValue::Other(json!(7)).to_answer_string(), "7");
    }

    #[test]
    fn saved_values_deserialize_into_known_shapes() {
        let text: ResponseValue = serde_json::from_value(json!("Yes")).unwrap();
        let list: ResponseValue = serde_json::from_value(json!(["A", {"text": "B"}])).unwrap();
        let choice: ResponseValue = serde_json::from_value(json!({"text": "C"})).unwrap();
        let other: ResponseValue = serde_json::from_value(json!(null)).unwrap();
        assert!(matches!(text, ResponseValue::Text(_)));
        assert_eq!(list.selections().len(), 2);
        assert!(matches!(choice, ResponseValue::Choice { .. }));
        assert!(!other.is_answered());
    }
}
