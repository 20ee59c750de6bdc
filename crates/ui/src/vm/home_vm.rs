use services::assessment_home::{AssessmentStep, StepStatus};
use services::{AssessmentOverview, FlowRoute};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepCardVm {
    pub number: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub estimated: &'static str,
    pub status_class: String,
    pub status_label: &'static str,
    pub counts: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssessmentHomeVm {
    pub steps: Vec<StepCardVm>,
    pub button_label: &'static str,
    pub entry: FlowRoute,
    pub can_view_results: bool,
    pub message: Option<String>,
}

fn status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "Completed",
        StepStatus::Current => "In progress",
        StepStatus::Upcoming => "Up next",
        StepStatus::Locked => "Locked",
    }
}

fn map_step(number: usize, step: &AssessmentStep) -> StepCardVm {
    StepCardVm {
        number,
        title: step.kind.title(),
        description: step.kind.description(),
        estimated: step.kind.estimated(),
        status_class: format!("step step-{}", step.status.as_str()),
        status_label: status_label(step.status),
        counts: step
            .counts
            .map(|(answered, total)| format!("{answered}/{total} questions")),
    }
}

#[must_use]
pub fn map_assessment_home(overview: &AssessmentOverview) -> AssessmentHomeVm {
    AssessmentHomeVm {
        steps: overview
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| map_step(index + 1, step))
            .collect(),
        button_label: overview.button_label(),
        entry: overview.entry_route(),
        can_view_results: overview.can_view_results(),
        message: overview.message().map(str::to_string),
    }
}
