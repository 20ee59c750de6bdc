//! Turning the recommendation and advice payloads the backend emits into
//! the canonical result model, plus the expand/collapse state of the
//! results screen.

mod advice;
mod board;
mod payload;

pub use advice::{mock_advice, normalize_advice};
pub use board::{DetailToggle, ResultsBoard};
pub use payload::{RawCareer, RecommendationsPayload, ResultsError, fallback_results, normalize};
