use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::ids::CareerId;

/// One normalized career match shown on the results screen.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: CareerId,
    pub title: String,
    pub description: String,
    /// Always within `0..=100`.
    pub match_score: u8,
    pub sector: String,
    pub salary_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_details: Option<Value>,
    pub growth_outlook: String,
    pub location: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub education_requirements: String,
    pub reasoning: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<CareerAdvice>,
}

impl Recommendation {
    #[must_use]
    pub fn match_label(&self) -> MatchLabel {
        MatchLabel::for_score(self.match_score)
    }
}

/// Qualitative band for a match score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchLabel {
    Excellent,
    Great,
    Good,
    Fair,
    Limited,
}

impl MatchLabel {
    #[must_use]
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => MatchLabel::Excellent,
            80..=89 => MatchLabel::Great,
            70..=79 => MatchLabel::Good,
            60..=69 => MatchLabel::Fair,
            _ => MatchLabel::Limited,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchLabel::Excellent => "Excellent Match",
            MatchLabel::Great => "Great Match",
            MatchLabel::Good => "Good Match",
            MatchLabel::Fair => "Fair Match",
            MatchLabel::Limited => "Limited Match",
        }
    }

    /// Style hook for the score badge.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            MatchLabel::Excellent => "match-excellent",
            MatchLabel::Great => "match-great",
            MatchLabel::Good => "match-good",
            MatchLabel::Fair => "match-fair",
            MatchLabel::Limited => "match-limited",
        }
    }
}

impl fmt::Display for MatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the results screen renders for one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerResults {
    pub recommendations: Vec<Recommendation>,
    pub strengths: Vec<String>,
    pub development_areas: Vec<String>,
    pub summary: String,
}

impl CareerResults {
    #[must_use]
    pub fn top_match(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }

    #[must_use]
    pub fn find(&self, id: &CareerId) -> Option<&Recommendation> {
        self.recommendations.iter().find(|career| &career.id == id)
    }

    pub fn find_mut(&mut self, id: &CareerId) -> Option<&mut Recommendation> {
        self.recommendations.iter_mut().find(|career| &career.id == id)
    }
}

/// Personalized development advice for one career.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAdvice {
    pub next_steps: Vec<String>,
    pub resources: Vec<String>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_score_bands() {
        assert_eq!(MatchLabel::for_score(100), MatchLabel::Excellent);
        assert_eq!(MatchLabel::for_score(90), MatchLabel::Excellent);
        assert_eq!(MatchLabel::for_score(85).as_str(), "Great Match");
        assert_eq!(MatchLabel::for_score(70), MatchLabel::Good);
        assert_eq!(MatchLabel::for_score(65), MatchLabel::Fair);
        assert_eq!(MatchLabel::for_score(10).to_string(), "Limited Match");
    }
}
