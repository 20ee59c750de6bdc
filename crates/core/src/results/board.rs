use std::collections::HashSet;

use crate::model::{CareerAdvice, CareerId, CareerResults};

/// Outcome of clicking a career's details control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailToggle {
    Collapsed,
    /// `fetch_advice` is set only the first time a career is expanded.
    Expanded { fetch_advice: bool },
}

/// Results plus the expansion state of the detail panels.
///
/// At most one career is expanded at a time, and advice is requested at
/// most once per career id for the lifetime of the board.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsBoard {
    results: CareerResults,
    expanded: Option<CareerId>,
    requested: HashSet<CareerId>,
}

impl ResultsBoard {
    #[must_use]
    pub fn new(results: CareerResults) -> Self {
        Self {
            results,
            expanded: None,
            requested: HashSet::new(),
        }
    }

    #[must_use]
    pub fn results(&self) -> &CareerResults {
        &self.results
    }

    #[must_use]
    pub fn expanded(&self) -> Option<&CareerId> {
        self.expanded.as_ref()
    }

    #[must_use]
    pub fn is_expanded(&self, id: &CareerId) -> bool {
        self.expanded.as_ref() == Some(id)
    }

    pub fn toggle(&mut self, id: &CareerId) -> DetailToggle {
        if self.is_expanded(id) {
            self.expanded = None;
            return DetailToggle::Collapsed;
        }
        self.expanded = Some(id.clone());
        let has_advice = self
            .results
            .find(id)
            .is_some_and(|career| career.advice.is_some());
        let fetch_advice = !has_advice && self.requested.insert(id.clone());
        DetailToggle::Expanded { fetch_advice }
    }

    /// Cache advice on the matching career. Unknown ids are ignored.
    pub fn attach_advice(&mut self, id: &CareerId, advice: CareerAdvice) -> bool {
        match self.results.find_mut(id) {
            Some(career) => {
                career.advice = Some(advice);
                true
            }
            None => false,
        }
    }
}
