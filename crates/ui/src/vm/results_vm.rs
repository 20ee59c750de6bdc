use navi_core::model::{CareerAdvice, CareerId, CareerResults, Recommendation};
use navi_core::results::ResultsBoard;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CareerCardVm {
    pub id: CareerId,
    pub title: String,
    pub description: String,
    pub score: String,
    pub match_label: &'static str,
    pub match_class: &'static str,
    pub sector: String,
    pub salary: String,
    pub growth: String,
    pub location: String,
    pub experience: String,
    pub education: String,
    pub skills: Vec<String>,
    pub reasoning: Vec<String>,
    pub expanded: bool,
    /// `None` while the advice request is in flight.
    pub advice: Option<CareerAdvice>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub summary: String,
    pub top_match: Option<String>,
    pub strengths: Vec<String>,
    pub development_areas: Vec<String>,
    pub careers: Vec<CareerCardVm>,
}

fn map_career(career: &Recommendation, expanded: bool) -> CareerCardVm {
    let label = career.match_label();
    CareerCardVm {
        id: career.id.clone(),
        title: career.title.clone(),
        description: career.description.clone(),
        score: format!("{}%", career.match_score),
        match_label: label.as_str(),
        match_class: label.css_class(),
        sector: career.sector.clone(),
        salary: career.salary_range.clone(),
        growth: career.growth_outlook.clone(),
        location: career.location.clone(),
        experience: career.experience_level.clone(),
        education: career.education_requirements.clone(),
        skills: career.required_skills.clone(),
        reasoning: career.reasoning.clone(),
        expanded,
        advice: career.advice.clone(),
    }
}

#[must_use]
pub fn map_results(board: &ResultsBoard) -> ResultsVm {
    let results: &CareerResults = board.results();
    ResultsVm {
        summary: results.summary.clone(),
        top_match: results.top_match().map(|career| career.title.clone()),
        strengths: results.strengths.clone(),
        development_areas: results.development_areas.clone(),
        careers: results
            .recommendations
            .iter()
            .map(|career| map_career(career, board.is_expanded(&career.id)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navi_core::results::normalize;
    use serde_json::json;

    #[test]
    fn cards_follow_the_board() {
        let results = normalize(&json!({
            "recommendations": [{"id": "c1", "title": "Carpenter", "matchScore": "91"}]
        }))
        .unwrap();
        let mut board = ResultsBoard::new(results);
        board.toggle(&CareerId::new("c1"));

        let vm = map_results(&board);
        assert_eq!(vm.top_match.as_deref(), Some("Carpenter"));
        let card = &vm.careers[0];
        assert!(card.expanded);
        assert_eq!(card.score, "91%");
        assert_eq!(card.match_label, "Excellent Match");
        assert_eq!(card.sector, "Construction");
        assert!(card.advice.is_none());
    }
}
