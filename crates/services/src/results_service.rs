use std::sync::{Arc, Mutex, PoisonError};

use navi_core::model::{CareerAdvice, CareerId, CareerResults, SessionId};
use navi_core::results::{DetailToggle, ResultsBoard, mock_advice, normalize, normalize_advice};

use crate::api::CareerApi;
use crate::error::ResultsServiceError;

/// Fetches a session's recommendations and manages the detail panels.
pub struct ResultsPresenter {
    api: Arc<dyn CareerApi>,
    board: Mutex<Option<ResultsBoard>>,
}

impl ResultsPresenter {
    #[must_use]
    pub fn new(api: Arc<dyn CareerApi>) -> Self {
        Self {
            api,
            board: Mutex::new(None),
        }
    }

    /// Load and normalize recommendations, replacing any previous board.
    ///
    /// # Errors
    ///
    /// `MissingSession` without a session id, `Rejected` when the server
    /// answers `success: false`, `Api` when the call fails.
    pub async fn load(
        &self,
        session_id: Option<&SessionId>,
    ) -> Result<CareerResults, ResultsServiceError> {
        let session_id = session_id
            .filter(|session_id| !session_id.is_empty())
            .ok_or(ResultsServiceError::MissingSession)?;
        let payload = self.api.recommendations(session_id).await?;
        let results = normalize(&payload)?;
        tracing::info!(
            recommendations = results.recommendations.len(),
            "career results loaded"
        );
        *self.lock() = Some(ResultsBoard::new(results.clone()));
        Ok(results)
    }

    /// Expand or collapse a career. The first expansion fetches advice and
    /// caches it on the career; later expansions reuse it.
    pub async fn toggle_details(&self, career_id: &CareerId) -> DetailToggle {
        let toggle = match self.lock().as_mut() {
            Some(board) => board.toggle(career_id),
            None => return DetailToggle::Collapsed,
        };
        if matches!(toggle, DetailToggle::Expanded { fetch_advice: true }) {
            let advice = self.fetch_advice(career_id).await;
            if let Some(board) = self.lock().as_mut() {
                board.attach_advice(career_id, advice);
            }
        }
        toggle
    }

    /// Advice for one career; the fixed mock stands in when the call fails.
    pub async fn fetch_advice(&self, career_id: &CareerId) -> CareerAdvice {
        match self.api.advice(career_id).await {
            Ok(payload) => normalize_advice(&payload),
            Err(err) => {
                tracing::warn!(error = %err, career = %career_id, "advice unavailable; using defaults");
                mock_advice()
            }
        }
    }

    #[must_use]
    pub fn board(&self) -> Option<ResultsBoard> {
        self.lock().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(Option<&ResultsBoard>) -> R) -> R {
        f(self.lock().as_ref())
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ResultsBoard>> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
