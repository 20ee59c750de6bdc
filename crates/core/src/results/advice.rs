use serde_json::Value;

use crate::model::CareerAdvice;

const DEFAULT_NEXT_STEPS: [&str; 3] = [
    "Research job opportunities in this field",
    "Develop relevant skills through online courses",
    "Network with professionals in the industry",
];

const DEFAULT_RESOURCES: [&str; 3] = [
    "Online learning platforms (Coursera, edX)",
    "Industry-specific certification programs",
    "Professional networking events",
];

/// Advice shown when the advice endpoint fails or returns nothing.
#[must_use]
pub fn mock_advice() -> CareerAdvice {
    CareerAdvice {
        next_steps: vec![
            "Research job opportunities in this field".to_string(),
            "Develop relevant skills through online courses".to_string(),
            "Build a portfolio showcasing your abilities".to_string(),
            "Network with professionals in the industry".to_string(),
        ],
        resources: vec![
            "Online learning platforms (Coursera, edX)".to_string(),
            "Industry-specific certification programs".to_string(),
            "Professional networking events".to_string(),
            "Relevant books and publications".to_string(),
        ],
        summary: "Suggested career development path".to_string(),
    }
}

/// Normalize an advice response, either `{success, advice}` or the advice
/// object itself.
#[must_use]
pub fn normalize_advice(value: &Value) -> CareerAdvice {
    let data = if value.get("success").and_then(Value::as_bool) == Some(true) {
        value.get("advice").unwrap_or(&Value::Null)
    } else {
        value
    };
    if data.is_null() {
        return mock_advice();
    }

    let skills = array(data, "skillDevelopment");
    let education = array(data, "education");

    let mut next_steps = Vec::new();
    for skill in skills {
        let resources: Vec<&str> = array(skill, "resources")
            .iter()
            .filter_map(Value::as_str)
            .collect();
        next_steps.push(format!(
            "Learn {}: {} ({})",
            text(skill, "skill"),
            resources.join(", "),
            skill
                .get("timeframe")
                .and_then(Value::as_str)
                .filter(|frame| !frame.is_empty())
                .unwrap_or("6 months")
        ));
    }
    for program in education {
        next_steps.push(format!(
            "{} at {} ({})",
            text(program, "program"),
            text(program, "provider"),
            text(program, "duration")
        ));
    }
    if let Some(timeline) = data.get("timeline") {
        for (key, label) in [
            ("shortTerm", "Short-term"),
            ("mediumTerm", "Medium-term"),
            ("longTerm", "Long-term"),
        ] {
            for step in array(timeline, key) {
                next_steps.push(format!("{label}: {}", plain(step)));
            }
        }
    }

    let mut resources = Vec::new();
    for skill in skills {
        let name = text(skill, "skill");
        for resource in array(skill, "resources") {
            resources.push(format!("{name}: {}", plain(resource)));
        }
    }
    for program in education {
        resources.push(format!(
            "{} ({})",
            text(program, "program"),
            text(program, "provider")
        ));
    }

    if next_steps.is_empty() {
        next_steps = DEFAULT_NEXT_STEPS.iter().map(|s| (*s).to_string()).collect();
    }
    if resources.is_empty() {
        resources = DEFAULT_RESOURCES.iter().map(|s| (*s).to_string()).collect();
    }

    CareerAdvice {
        next_steps,
        resources,
        summary: data
            .get("summary")
            .and_then(Value::as_str)
            .filter(|summary| !summary.is_empty())
            .unwrap_or("Personalized career development advice based on your profile")
            .to_string(),
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn plain(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}
