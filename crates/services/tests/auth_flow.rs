use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use navi_core::auth::AuthUser;
use navi_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};
use navi_core::verification::{CODE_TTL_SECS, VerificationCode};
use services::api::{Acknowledgement, AuthApi, LoginResponse, ProfileResponse, SignupRequest};
use services::auth_flow::{
    MSG_ALREADY_VERIFIED, MSG_CODE_RESENT, MSG_RESET_TOKEN_MISSING, MSG_VERIFIED,
};
use services::{
    ApiError, AuthFlowError, AuthFlowService, AuthStore, LoginOutcome, ResetOutcome,
    VerificationTimer, VerifyOutcome,
};
use storage::repository::{Storage, keys};

type Reply<T> = Result<T, ApiError>;

#[derive(Default)]
struct FakeAuthApi {
    calls: Mutex<Vec<String>>,
    login: Mutex<VecDeque<Reply<LoginResponse>>>,
    acks: Mutex<VecDeque<Reply<Acknowledgement>>>,
}

impl FakeAuthApi {
    fn push_login(&self, reply: Reply<LoginResponse>) {
        self.login.lock().unwrap().push_back(reply);
    }

    fn push_ack(&self, reply: Reply<Acknowledgement>) {
        self.acks.lock().unwrap().push_back(reply);
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_ack(&self) -> Reply<Acknowledgement> {
        self.acks.lock().unwrap().pop_front().unwrap_or(Ok(Acknowledgement {
            success: true,
            message: None,
        }))
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn signup(&self, request: &SignupRequest) -> Reply<Acknowledgement> {
        self.log(format!("signup {}", request.email));
        self.next_ack()
    }

    async fn login(&self, email: &str, _password: &str) -> Reply<LoginResponse> {
        self.log(format!("login {email}"));
        self.login
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LoginResponse::default()))
    }

    async fn verify_email(&self, email: &str, code: &str) -> Reply<Acknowledgement> {
        self.log(format!("verify {email} {code}"));
        self.next_ack()
    }

    async fn resend_verification(&self, email: &str) -> Reply<Acknowledgement> {
        self.log(format!("resend {email}"));
        self.next_ack()
    }

    async fn forgot_password(&self, email: &str) -> Reply<Acknowledgement> {
        self.log(format!("forgot {email}"));
        self.next_ack()
    }

    async fn reset_password(&self, token: &str, _password: &str) -> Reply<Acknowledgement> {
        self.log(format!("reset {token}"));
        self.next_ack()
    }

    async fn profile(&self) -> Reply<ProfileResponse> {
        self.log("profile".to_string());
        Ok(ProfileResponse::default())
    }
}

fn status(status: u16, code: Option<&str>, message: Option<&str>) -> ApiError {
    ApiError::Status {
        status,
        code: code.map(str::to_string),
        message: message.map(str::to_string),
    }
}

struct Harness {
    api: Arc<FakeAuthApi>,
    store: Arc<AuthStore>,
    storage: Storage,
    flow: AuthFlowService,
}

fn harness() -> Harness {
    let storage = Storage::in_memory();
    let store = Arc::new(
        AuthStore::new(storage.clone(), fixed_clock()).with_redirect_delay(Duration::ZERO),
    );
    let api = Arc::new(FakeAuthApi::default());
    let flow = AuthFlowService::new(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&store));
    Harness {
        api,
        store,
        storage,
        flow,
    }
}

fn full_code(digits: &str) -> VerificationCode {
    let mut code = VerificationCode::new();
    assert!(code.paste(digits));
    code
}

#[tokio::test]
async fn invalid_login_form_sends_nothing() {
    let h = harness();
    let err = h.flow.login("not-an-email", "123", false).await.unwrap_err();
    let AuthFlowError::Invalid(fields) = err else {
        panic!("expected field errors");
    };
    assert_eq!(fields.get("email"), Some(&"Please enter a valid email"));
    assert_eq!(
        fields.get("password"),
        Some(&"Password must be at least 6 characters")
    );
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn login_saves_credentials_in_the_chosen_scope() {
    let h = harness();
    h.api.push_login(Ok(LoginResponse {
        success: true,
        token: Some("tok".into()),
        user: Some(AuthUser {
            first_name: "Ada".into(),
            ..AuthUser::default()
        }),
        message: None,
    }));

    let outcome = h.flow.login("  Ada@Example.COM ", "secret1", false).await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::SignedIn {
            message: "Login successful!".into()
        }
    );
    assert_eq!(h.api.calls(), vec!["login ada@example.com".to_string()]);
    assert!(h.store.is_authenticated());
    assert_eq!(
        h.storage.session.get(keys::TOKEN).await.unwrap().as_deref(),
        Some("tok")
    );
    assert!(h.storage.persistent.get(keys::TOKEN).await.unwrap().is_none());
}

#[tokio::test]
async fn unverified_login_routes_to_verification() {
    let h = harness();
    h.api.push_login(Err(status(403, Some("Email not verified"), None)));

    let outcome = h.flow.login("ada@example.com", "secret1", true).await.unwrap();
    assert!(matches!(
        outcome,
        LoginOutcome::NeedsVerification { ref email, .. } if email == "ada@example.com"
    ));
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn rejected_login_shows_the_server_message() {
    let h = harness();
    h.api
        .push_login(Err(status(401, None, Some("Invalid credentials"))));
    let err = h.flow.login("ada@example.com", "secret1", true).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");

    h.api.push_login(Err(status(500, None, None)));
    let err = h.flow.login("ada@example.com", "secret1", true).await.unwrap_err();
    assert_eq!(err.to_string(), "Something went wrong. Please try again.");
}

#[tokio::test]
async fn signup_starts_a_verification_window() {
    let h = harness();
    let outcome = h
        .flow
        .signup(SignupRequest {
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            email: "ADA@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert_eq!(outcome.email, "ada@example.com");
    assert_eq!(outcome.first_name, "Ada");

    let pending = h.flow.pending_verification().await.unwrap().unwrap();
    assert_eq!(pending.email, "ada@example.com");
    assert_eq!(
        h.store.verification_deadline("ada@example.com").await.unwrap(),
        Some(FIXED_TEST_TIMESTAMP + CODE_TTL_SECS)
    );
    assert_eq!(
        h.flow.verification_timer("ada@example.com").await.unwrap(),
        VerificationTimer {
            seconds_left: CODE_TTL_SECS,
            can_resend: false
        }
    );
}

#[tokio::test]
async fn elapsed_deadline_is_cleared_and_allows_resend() {
    let h = harness();
    h.store
        .set_verification_deadline("ada@example.com", FIXED_TEST_TIMESTAMP - 5)
        .await
        .unwrap();

    let timer = h.flow.verification_timer("ada@example.com").await.unwrap();
    assert!(timer.can_resend);
    assert_eq!(timer.seconds_left, 0);
    assert!(h
        .store
        .verification_deadline("ada@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn incomplete_code_is_not_sent() {
    let h = harness();
    let mut code = VerificationCode::new();
    code.input(0, "1");
    assert!(matches!(
        h.flow.verify("ada@example.com", &code).await,
        Err(AuthFlowError::IncompleteCode)
    ));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn verification_outcomes() {
    let h = harness();
    let email = "ada@example.com";

    h.store.set_verification_deadline(email, FIXED_TEST_TIMESTAMP + 60).await.unwrap();
    h.api.push_ack(Ok(Acknowledgement {
        success: false,
        message: Some("Email verified successfully".into()),
    }));
    assert_eq!(
        h.flow.verify(email, &full_code("12345")).await.unwrap(),
        VerifyOutcome::Verified {
            message: MSG_VERIFIED
        }
    );
    assert!(h.store.verification_deadline(email).await.unwrap().is_none());

    h.api
        .push_ack(Err(status(400, Some("Email is already verified"), None)));
    assert_eq!(
        h.flow.verify(email, &full_code("12345")).await.unwrap(),
        VerifyOutcome::AlreadyVerified {
            message: MSG_ALREADY_VERIFIED
        }
    );

    h.api.push_ack(Err(status(
        400,
        None,
        Some("Verification code has expired"),
    )));
    assert!(matches!(
        h.flow.verify(email, &full_code("12345")).await,
        Err(AuthFlowError::CodeExpired(_))
    ));

    h.api.push_ack(Err(status(400, None, None)));
    let err = h.flow.verify(email, &full_code("12345")).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid verification code. Please try again.");
}

#[tokio::test]
async fn resend_enforces_a_cooldown() {
    let h = harness();
    let email = "ada@example.com";

    assert_eq!(h.flow.resend(email).await.unwrap(), MSG_CODE_RESENT);
    assert_eq!(h.flow.resend_cooldown(email), 60);
    assert!(matches!(
        h.flow.resend(email).await,
        Err(AuthFlowError::Cooldown(60))
    ));
    assert_eq!(h.api.calls(), vec![format!("resend {email}")]);
    assert_eq!(
        h.store.verification_deadline(email).await.unwrap(),
        Some(FIXED_TEST_TIMESTAMP + CODE_TTL_SECS)
    );
}

#[tokio::test]
async fn failed_resend_does_not_start_a_cooldown() {
    let h = harness();
    h.api.push_ack(Err(status(429, Some("Too many requests"), None)));
    let err = h.flow.resend("ada@example.com").await.unwrap_err();
    assert_eq!(err.to_string(), "Too many requests");
    assert_eq!(h.flow.resend_cooldown("ada@example.com"), 0);
}

#[tokio::test]
async fn password_reset_paths() {
    let h = harness();

    let err = h.flow.reset_password(None, "secret1", "secret1").await.unwrap_err();
    assert_eq!(err.to_string(), MSG_RESET_TOKEN_MISSING);

    let err = h
        .flow
        .reset_password(Some("tok"), "secret1", "secret2")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthFlowError::Invalid(ref fields) if fields.get("confirmPassword") == Some(&"Passwords do not match")
    ));
    assert!(h.api.calls().is_empty());

    assert_eq!(
        h.flow
            .reset_password(Some("tok"), "secret1", "secret1")
            .await
            .unwrap(),
        ResetOutcome::Done {
            message: "Password has been reset successfully".into()
        }
    );

    h.api
        .push_ack(Err(status(400, Some("Invalid or expired token"), None)));
    assert_eq!(
        h.flow
            .reset_password(Some("tok"), "secret1", "secret1")
            .await
            .unwrap(),
        ResetOutcome::LinkExpired {
            message: "Invalid or expired token".into()
        }
    );
}

#[tokio::test]
async fn forgot_password_reports_what_the_server_said() {
    let h = harness();
    assert_eq!(
        h.flow.forgot_password("ada@example.com").await.unwrap(),
        "Password reset instructions sent to your email"
    );
    h.api.push_ack(Err(status(404, Some("No account with that email"), None)));
    let err = h.flow.forgot_password("ada@example.com").await.unwrap_err();
    assert_eq!(err.to_string(), "No account with that email");
    assert!(matches!(
        h.flow.forgot_password("").await,
        Err(AuthFlowError::Invalid(_))
    ));
}

#[tokio::test]
async fn logout_clears_credentials() {
    let h = harness();
    h.store
        .save_auth_token("tok", AuthUser::default(), true)
        .await
        .unwrap();
    h.flow.logout().await.unwrap();
    assert!(!h.store.is_authenticated());
    assert!(h.storage.persistent.get(keys::TOKEN).await.unwrap().is_none());
}
