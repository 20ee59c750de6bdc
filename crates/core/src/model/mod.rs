mod assessment;
mod ids;
mod progress;
mod question;
mod recommendation;
mod response;

pub use assessment::{AssessmentSession, Stage, StageHandoff};
pub use ids::{CareerId, ParseIdError, QuestionId, SessionId};
pub use progress::{CompletionMark, ProgressDetails, ProgressSnapshot, RedirectTarget};
pub use question::{InputType, Question, QuestionOption, parse_options};
pub use recommendation::{CareerAdvice, CareerResults, MatchLabel, Recommendation};
pub use response::{ResponseValue, ValidationError, toggle_selection, validate_response};
