use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{CareerId, CareerResults, Recommendation};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultsError {
    /// The server answered with `success: false`.
    #[error("{message}")]
    Rejected { message: String },
}

/// A single entry in a recommendations array: a bare title or an object.
#[derive(Clone, Debug, PartialEq)]
pub enum RawCareer {
    Title(String),
    Detailed(Map<String, Value>),
}

/// Every recommendations payload shape the backend has been observed to send.
#[derive(Clone, Debug, PartialEq)]
pub enum RecommendationsPayload {
    /// `{recommendations: [...]}`
    Flat(Vec<RawCareer>),
    /// `{success: false, message}`
    Rejected { message: Option<String> },
    /// `{data: {...}}`
    Nested(Box<RecommendationsPayload>),
    /// Anything else; only summary fields can be salvaged.
    Unknown {
        strengths: Option<Vec<String>>,
        development_areas: Option<Vec<String>>,
        summary: Option<String>,
    },
}

impl RecommendationsPayload {
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::unknown(&Map::new());
        };

        if object.get("success") == Some(&Value::Bool(false)) {
            return Self::Rejected {
                message: object
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };
        }

        if let Some(Value::Array(items)) = object.get("recommendations") {
            return Self::Flat(items.iter().filter_map(RawCareer::from_value).collect());
        }

        if let Some(data) = object.get("data").filter(|data| data.is_object()) {
            return Self::Nested(Box::new(Self::classify(data)));
        }

        Self::unknown(object)
    }

    fn unknown(object: &Map<String, Value>) -> Self {
        let strengths = ["strengths", "topSkills", "skills"]
            .iter()
            .find_map(|key| object.get(*key).filter(|value| is_present(value)))
            .map(ensure_array);
        Self::Unknown {
            strengths,
            development_areas: object
                .get("developmentAreas")
                .filter(|value| is_present(value))
                .map(ensure_array),
            summary: object
                .get("summary")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        }
    }
}

impl RawCareer {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(title) => Some(RawCareer::Title(title.clone())),
            Value::Object(map) => Some(RawCareer::Detailed(map.clone())),
            _ => None,
        }
    }

    fn title(&self) -> String {
        match self {
            RawCareer::Title(title) => title.clone(),
            RawCareer::Detailed(map) => map.get("title").map(stringify).unwrap_or_default(),
        }
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match self {
            RawCareer::Title(_) => None,
            RawCareer::Detailed(map) => map.get(key).filter(|value| is_present(value)),
        }
    }
}

/// Normalize a recommendations response into [`CareerResults`].
///
/// # Errors
///
/// Returns `ResultsError::Rejected` when the server explicitly reports
/// failure. Every other shape, including an empty object, yields results.
pub fn normalize(value: &Value) -> Result<CareerResults, ResultsError> {
    resolve(RecommendationsPayload::classify(value))
}

fn resolve(payload: RecommendationsPayload) -> Result<CareerResults, ResultsError> {
    match payload {
        RecommendationsPayload::Rejected { message } => Err(ResultsError::Rejected {
            message: message.unwrap_or_else(|| "Failed to fetch recommendations".to_string()),
        }),
        RecommendationsPayload::Nested(inner) => resolve(*inner),
        RecommendationsPayload::Flat(careers) if careers.is_empty() => Ok(fallback_results(None, None, None)),
        RecommendationsPayload::Flat(careers) => Ok(CareerResults {
            recommendations: careers
                .iter()
                .enumerate()
                .map(|(index, career)| normalize_career(index, career))
                .collect(),
            strengths: strings(&[
                "Analytical Thinking",
                "Technical Understanding",
                "Problem Solving",
                "Attention to Detail",
            ]),
            development_areas: strings(&[
                "Leadership",
                "Project Management",
                "Industry-specific Knowledge",
            ]),
            summary: "Based on your assessment, we have identified careers that align with your analytical and technical abilities".to_string(),
        }),
        RecommendationsPayload::Unknown {
            strengths,
            development_areas,
            summary,
        } => Ok(fallback_results(strengths, development_areas, summary)),
    }
}

/// The fixed single-career result used when nothing usable came back.
#[must_use]
pub fn fallback_results(
    strengths: Option<Vec<String>>,
    development_areas: Option<Vec<String>>,
    summary: Option<String>,
) -> CareerResults {
    CareerResults {
        recommendations: vec![Recommendation {
            id: CareerId::new("fallback-1"),
            title: "Software Developer".to_string(),
            description: "Design, build, and maintain software applications.".to_string(),
            match_score: 85,
            sector: "Technology".to_string(),
            salary_range: "$70,000 - $120,000".to_string(),
            salary_details: None,
            growth_outlook: "Excellent".to_string(),
            location: "Remote / Various".to_string(),
            experience_level: "Entry to Senior".to_string(),
            required_skills: strings(&["Programming", "Problem-solving", "Logical thinking"]),
            education_requirements: "Bachelor's degree preferred".to_string(),
            reasoning: vec![
                "This career matches your profile based on your assessment responses".to_string(),
            ],
            advice: None,
        }],
        strengths: strengths
            .unwrap_or_else(|| strings(&["Problem-solving", "Analytical thinking"])),
        development_areas: development_areas
            .unwrap_or_else(|| strings(&["Communication", "Time management"])),
        summary: summary
            .unwrap_or_else(|| "We found career options that match your profile".to_string()),
    }
}

struct CareerDefaults {
    sector: &'static str,
    description: String,
    salary: &'static str,
    growth_outlook: &'static str,
    skills: &'static [&'static str],
}

fn defaults_for(title: &str) -> CareerDefaults {
    match title {
        "Construction Project Manager" => CareerDefaults {
            sector: "Construction",
            description: "Oversees construction projects from planning to completion, managing timelines, budgets, and teams.".to_string(),
            salary: "$70,000 - $120,000",
            growth_outlook: "Very Good",
            skills: &["Project Management", "Leadership", "Construction Knowledge", "Budget Management"],
        },
        "Building Inspector" => CareerDefaults {
            sector: "Construction",
            description: "Examines buildings to ensure they meet building codes, zoning regulations, and safety standards.".to_string(),
            salary: "$55,000 - $85,000",
            growth_outlook: "Good",
            skills: &["Building Codes", "Attention to Detail", "Technical Knowledge", "Report Writing"],
        },
        "Carpenter" => CareerDefaults {
            sector: "Construction",
            description: "Constructs, installs, and repairs structures made of wood and other materials.".to_string(),
            salary: "$45,000 - $75,000",
            growth_outlook: "Stable",
            skills: &["Hand Tools", "Measurement", "Physical Stamina", "Problem Solving"],
        },
        other => CareerDefaults {
            sector: "General",
            description: format!("Career as a {other}"),
            salary: "$50,000 - $100,000",
            growth_outlook: "Good",
            skills: &["Communication", "Problem Solving", "Attention to Detail"],
        },
    }
}

fn normalize_career(index: usize, career: &RawCareer) -> Recommendation {
    let title = career.title();
    let defaults = defaults_for(&title);
    let default_skills = defaults.skills;

    let (salary_range, salary_details) = match career.field("averageSalary") {
        Some(Value::Object(salary)) => (salary_text(salary), Some(Value::Object(salary.clone()))),
        Some(other) => (stringify(other), None),
        None => (defaults.salary.to_string(), None),
    };

    let mut required_skills = career
        .field("requiredSkills")
        .map(ensure_array)
        .unwrap_or_else(|| strings(default_skills));
    dedup_in_order(&mut required_skills);

    let text_or = |key: &str, default: &str| {
        career
            .field(key)
            .map(stringify)
            .unwrap_or_else(|| default.to_string())
    };

    Recommendation {
        id: career
            .field("id")
            .map(|id| CareerId::new(stringify(id)))
            .unwrap_or_else(|| CareerId::new(format!("career-{index}"))),
        description: text_or("description", &defaults.description),
        match_score: match_score(career.field("matchScore"), index),
        sector: text_or("sector", defaults.sector),
        salary_range,
        salary_details,
        growth_outlook: text_or("growthOutlook", defaults.growth_outlook),
        location: text_or("location", "Various locations"),
        experience_level: text_or("experienceLevel", "Entry to Senior level"),
        required_skills,
        education_requirements: text_or(
            "educationRequirements",
            "Varies by position and employer",
        ),
        reasoning: vec![
            "Based on your assessment responses".to_string(),
            format!(
                "Strong match for your {} skills",
                default_skills[0].to_lowercase()
            ),
            format!(
                "Good fit for your interest in {}",
                defaults.sector.to_lowercase()
            ),
        ],
        title,
        advice: None,
    }
}

/// A usable score (number or numeric string, non-zero) is clamped into
/// `0..=100`; otherwise the score decays with list position from 85.
fn match_score(raw: Option<&Value>, index: usize) -> u8 {
    let parsed = raw.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    });
    #[allow(clippy::cast_precision_loss)]
    let score = match parsed {
        Some(score) if score != 0.0 && score.is_finite() => score,
        _ => 85.0 - 10.0 * index as f64,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = score.round().clamp(0.0, 100.0) as u8;
    clamped
}

fn salary_text(salary: &Map<String, Value>) -> String {
    match salary.get("midLevel").filter(|value| is_present(value)) {
        Some(mid) => stringify(mid),
        None => format!(
            "{} to {}",
            salary.get("entryLevel").map(stringify).unwrap_or_default(),
            salary.get("seniorLevel").map(stringify).unwrap_or_default()
        ),
    }
}

/// Coerce a list-ish value to strings: arrays pass through, strings are
/// parsed as JSON arrays or split on commas.
fn ensure_array(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(stringify).collect(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items.iter().map(stringify).collect(),
            _ => text
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        },
        other => vec![stringify(other)],
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}
