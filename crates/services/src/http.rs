use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use navi_core::model::{CareerId, SessionId};
use navi_core::wizard::{DraftSnapshot, Submission, WizardStage};

use crate::api::{
    Acknowledgement, AssessmentApi, AuthApi, CareerApi, LoginResponse, ObjectiveSubmitResponse,
    PersonalSubmitResponse, ProfileResponse, ProgressResponse, QuestionSet, ResumeResponse,
    SignupRequest,
};
use crate::auth_store::AuthStore;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Login, signup and verification requests answer 401 for bad credentials,
/// which must reach the form instead of ending the session.
#[must_use]
pub fn is_auth_attempt(path: &str) -> bool {
    path.contains("/auth/")
        && ["/login", "/signin", "/signup", "/verify"]
            .iter()
            .any(|segment| path.contains(segment))
}

/// The one configured HTTP client. Implements every API trait.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    auth: Arc<AuthStore>,
}

impl ApiClient {
    /// Build a client with the configured timeout and JSON content type.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn new(config: ApiConfig, auth: Arc<AuthStore>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            config,
            auth,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path)?;
        decode(self.send(Method::GET, url, None).await?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        let body = serde_json::to_value(body)?;
        decode(self.send(Method::POST, url, Some(body)).await?)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value, ApiError> {
        let path = url.path().to_string();
        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = self.auth.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(method = %method, path = %path, status = status.as_u16(), "api response");

        let payload = parse_body(&text);
        if status.is_success() {
            Ok(payload)
        } else {
            Err(self.classify_failure(status, &path, &payload).await)
        }
    }

    /// Turn a non-success response into an `ApiError`, ending the session on
    /// a 401 from anything but an auth attempt.
    async fn classify_failure(&self, status: StatusCode, path: &str, body: &Value) -> ApiError {
        if status == StatusCode::UNAUTHORIZED && !is_auth_attempt(path) {
            if let Err(err) = self.auth.expire_session().await {
                tracing::warn!(error = %err, "failed to clear expired credentials");
            }
            return ApiError::SessionExpired;
        }
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
        ApiError::Status {
            status: status.as_u16(),
            code: field("error"),
            message: field("message"),
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    let payload = if payload.is_null() { json!({}) } else { payload };
    Ok(serde_json::from_value(payload)?)
}

#[async_trait]
impl AssessmentApi for ApiClient {
    async fn resume(&self) -> Result<ResumeResponse, ApiError> {
        self.get("/api/questions/resume").await
    }

    async fn progress(&self) -> Result<ProgressResponse, ApiError> {
        self.get("/api/questions/progress").await
    }

    async fn clear_progress(&self) -> Result<(), ApiError> {
        let url = self.config.endpoint("/api/questions/progress")?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn stage_questions(&self, stage: WizardStage) -> Result<QuestionSet, ApiError> {
        match stage {
            WizardStage::Personal => self.get("/api/questions/initial").await,
            WizardStage::Objective => self.get("/api/questions/objective").await,
        }
    }

    async fn save_progress(&self, draft: &DraftSnapshot) -> Result<(), ApiError> {
        let _: Value = self.post("/api/questions/save-progress", draft).await?;
        Ok(())
    }

    async fn submit_personal(
        &self,
        submission: &Submission,
    ) -> Result<PersonalSubmitResponse, ApiError> {
        self.post("/api/questions/personal", submission).await
    }

    async fn submit_objective(
        &self,
        submission: &Submission,
    ) -> Result<ObjectiveSubmitResponse, ApiError> {
        self.post("/api/questions/objective", submission).await
    }

    async fn retake(&self) -> Result<Acknowledgement, ApiError> {
        self.post("/api/questions/retake", &json!({})).await
    }
}

#[async_trait]
impl CareerApi for ApiClient {
    async fn recommendations(&self, session_id: &SessionId) -> Result<Value, ApiError> {
        let mut url = self.config.endpoint("/api/career/recommendations")?;
        url.query_pairs_mut()
            .append_pair("sessionId", session_id.as_str());
        self.send(Method::GET, url, None).await
    }

    async fn advice(&self, career_id: &CareerId) -> Result<Value, ApiError> {
        let mut url = self.config.endpoint("/api/career/advice")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(career_id.as_str());
        self.send(Method::GET, url, None).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, ApiError> {
        self.post("/api/auth/signup", request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post(
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn verify_email(&self, email: &str, code: &str) -> Result<Acknowledgement, ApiError> {
        self.post(
            "/api/auth/verify-email",
            &json!({ "email": email, "code": code }),
        )
        .await
    }

    async fn resend_verification(&self, email: &str) -> Result<Acknowledgement, ApiError> {
        self.post("/api/auth/resend-verification", &json!({ "email": email }))
            .await
    }

    async fn forgot_password(&self, email: &str) -> Result<Acknowledgement, ApiError> {
        self.post("/api/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<Acknowledgement, ApiError> {
        self.post(
            "/api/auth/reset-password",
            &json!({ "token": token, "password": password }),
        )
        .await
    }

    async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        self.get("/api/auth/profile").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use navi_core::auth::AuthUser;
    use navi_core::time::fixed_clock;
    use storage::repository::{Storage, keys};

    use crate::auth_store::AuthEvent;

    fn client(storage: Storage) -> ApiClient {
        let auth = Arc::new(
            AuthStore::new(storage, fixed_clock()).with_redirect_delay(Duration::ZERO),
        );
        let config = ApiConfig::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        ApiClient::new(config, auth).unwrap()
    }

    #[test]
    fn auth_attempts_are_recognized() {
        assert!(is_auth_attempt("/api/auth/login"));
        assert!(is_auth_attempt("/api/auth/signup"));
        assert!(is_auth_attempt("/api/auth/verify-email"));
        assert!(!is_auth_attempt("/api/auth/profile"));
        assert!(!is_auth_attempt("/api/auth/resend-verification"));
        assert!(!is_auth_attempt("/api/questions/resume"));
    }

    #[test]
    fn bodies_parse_leniently() {
        assert_eq!(parse_body("  "), Value::Null);
        assert_eq!(parse_body("<html>"), Value::String("<html>".into()));
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
        let ack: Acknowledgement = decode(Value::Null).unwrap();
        assert!(!ack.success);
    }

    #[tokio::test]
    async fn unauthorized_request_expires_the_session() {
        let storage = Storage::in_memory();
        let api = client(storage.clone());
        api.auth
            .save_auth_token("t", AuthUser::default(), true)
            .await
            .unwrap();
        let mut events = api.auth.subscribe();

        let err = api
            .classify_failure(StatusCode::UNAUTHORIZED, "/api/questions/resume", &Value::Null)
            .await;
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(storage.persistent.get(keys::TOKEN).await.unwrap().is_none());
        assert!(!api.auth.is_authenticated());
        assert!(matches!(
            events.recv().await.unwrap(),
            AuthEvent::SessionExpired { .. }
        ));
    }

    #[tokio::test]
    async fn unauthorized_login_passes_through() {
        let storage = Storage::in_memory();
        let api = client(storage.clone());
        api.auth
            .save_auth_token("t", AuthUser::default(), false)
            .await
            .unwrap();

        let err = api
            .classify_failure(
                StatusCode::UNAUTHORIZED,
                "/api/auth/login",
                &json!({"message": "Invalid credentials"}),
            )
            .await;
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(api.auth.is_authenticated());
    }

    #[tokio::test]
    async fn error_fields_are_kept_apart() {
        let api = client(Storage::in_memory());
        let err = api
            .classify_failure(
                StatusCode::FORBIDDEN,
                "/api/auth/login",
                &json!({"error": "Email not verified", "message": "Check your inbox"}),
            )
            .await;
        assert_eq!(err.server_code(), Some("Email not verified"));
        assert_eq!(err.server_message(), Some("Check your inbox"));
    }

    #[test]
    fn advice_path_escapes_the_career_id() {
        let config = ApiConfig::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        let mut url = config.endpoint("/api/career/advice").unwrap();
        url.path_segments_mut().unwrap().push("a b/c");
        assert_eq!(url.path(), "/api/career/advice/a%20b%2Fc");
    }
}
