use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "https://navi-iq.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.trim())?,
            timeout,
        })
    }

    /// Read `NAVI_API_URL` and `NAVI_API_TIMEOUT_SECS`, falling back to the
    /// hosted backend and a 15 second timeout.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `NAVI_API_URL` is set but malformed.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let base_url = env::var("NAVI_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let timeout = env::var("NAVI_API_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(&base_url, Duration::from_secs(timeout))
    }

    /// Resolve an API path such as `/api/questions/initial` against the base.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))
    }
}
