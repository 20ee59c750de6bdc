mod home_vm;
mod question_vm;
mod results_vm;
pub(crate) mod time_fmt;

pub use home_vm::{AssessmentHomeVm, StepCardVm, map_assessment_home};
pub use question_vm::{
    AnswerInput, OptionVm, QuestionCardVm, StatusVm, map_question_card, map_status, submit_label,
};
pub use results_vm::{CareerCardVm, ResultsVm, map_results};
