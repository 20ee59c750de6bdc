//! Signup, login, email verification and password reset.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use navi_core::auth::{
    AuthUser, normalize_email, validate_email_only, validate_login, validate_reset,
    validate_signup,
};
use navi_core::verification::{
    CODE_TTL_SECS, PendingVerification, RESEND_COOLDOWN_SECS, VerificationCode,
    is_already_verified, mentions_expired, seconds_remaining,
};

use crate::api::{AuthApi, SignupRequest};
use crate::auth_store::AuthStore;
use crate::error::{ApiError, AuthFlowError};

pub const MSG_GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const MSG_LOGIN_OK: &str = "Login successful!";
pub const MSG_SIGNUP_OK: &str = "Account created! Check your email for a verification code.";
pub const MSG_VERIFIED: &str = "Account verified successfully! You can now sign in.";
pub const MSG_ALREADY_VERIFIED: &str = "Your account is already verified. Please sign in.";
pub const MSG_INVALID_CODE: &str = "Invalid verification code. Please try again.";
pub const MSG_CODE_RESENT: &str = "New verification code sent successfully!";
pub const MSG_RESEND_FAILED: &str = "Failed to resend verification code. Please try again.";
pub const MSG_RESET_LINK_SENT: &str = "Password reset instructions sent to your email";
pub const MSG_PASSWORD_RESET: &str = "Password has been reset successfully";
pub const MSG_RESET_TOKEN_MISSING: &str =
    "Reset token is missing. Please use the link from your email.";

const UNVERIFIED_CODE: &str = "Email not verified";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn { message: String },
    /// The account exists but the email was never confirmed.
    NeedsVerification { email: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupOutcome {
    pub email: String,
    pub first_name: String,
    pub message: String,
}

/// Both variants send the user to the login screen with `message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified { message: &'static str },
    AlreadyVerified { message: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    Done { message: String },
    /// The token was rejected; the user should request a new link.
    LinkExpired { message: String },
}

/// Countdown state for the code entry screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationTimer {
    pub seconds_left: i64,
    pub can_resend: bool,
}

/// Form-level account flows. Credentials are persisted only through the
/// [`AuthStore`].
pub struct AuthFlowService {
    api: Arc<dyn AuthApi>,
    store: Arc<AuthStore>,
    resend_blocked_until: Mutex<HashMap<String, i64>>,
}

impl AuthFlowService {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<AuthStore>) -> Self {
        Self {
            api,
            store,
            resend_blocked_until: Mutex::new(HashMap::new()),
        }
    }

    /// # Errors
    ///
    /// `Invalid` for bad fields, `Rejected` with the server's message when
    /// login fails, `Store` if credentials cannot be saved.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AuthFlowError> {
        let errors = validate_login(email, password);
        if !errors.is_empty() {
            return Err(AuthFlowError::Invalid(errors));
        }
        let email = normalize_email(email);

        let response = match self.api.login(&email, password).await {
            Ok(response) => response,
            Err(err) if err.status() == Some(403) && err.server_code() == Some(UNVERIFIED_CODE) => {
                tracing::info!("login blocked until email is verified");
                return Ok(LoginOutcome::NeedsVerification {
                    message: err.server_message().unwrap_or(UNVERIFIED_CODE).to_string(),
                    email,
                });
            }
            Err(err) => return Err(AuthFlowError::Rejected(err.user_message(MSG_GENERIC_FAILURE))),
        };

        let (true, Some(token), Some(user)) = (response.success, response.token, response.user)
        else {
            return Err(AuthFlowError::Rejected(
                response.message.unwrap_or_else(|| MSG_GENERIC_FAILURE.to_string()),
            ));
        };
        self.store.save_auth_token(&token, user, remember_me).await?;
        tracing::info!(remember_me, "signed in");
        Ok(LoginOutcome::SignedIn {
            message: response.message.unwrap_or_else(|| MSG_LOGIN_OK.to_string()),
        })
    }

    /// Create an account and start its verification window.
    ///
    /// # Errors
    ///
    /// `Invalid` for bad fields, `Rejected` when the server refuses,
    /// `Store` if the pending record cannot be written.
    pub async fn signup(&self, mut request: SignupRequest) -> Result<SignupOutcome, AuthFlowError> {
        let errors = validate_signup(
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.password,
        );
        if !errors.is_empty() {
            return Err(AuthFlowError::Invalid(errors));
        }
        request.email = normalize_email(&request.email);
        request.first_name = request.first_name.trim().to_string();
        request.last_name = request.last_name.trim().to_string();

        let ack = self
            .api
            .signup(&request)
            .await
            .map_err(|err| AuthFlowError::Rejected(server_text(&err, MSG_GENERIC_FAILURE)))?;
        if !ack.success {
            return Err(AuthFlowError::Rejected(
                ack.message.unwrap_or_else(|| MSG_GENERIC_FAILURE.to_string()),
            ));
        }

        self.store
            .record_pending_verification(&request.email, &request.first_name)
            .await?;
        let now = self.store.clock().unix_secs();
        self.store
            .set_verification_deadline(&request.email, now + CODE_TTL_SECS)
            .await?;
        tracing::info!("account created; awaiting verification");
        Ok(SignupOutcome {
            email: request.email,
            first_name: request.first_name,
            message: ack.message.unwrap_or_else(|| MSG_SIGNUP_OK.to_string()),
        })
    }

    /// The signup being verified, if it happened in the last ten minutes.
    ///
    /// # Errors
    ///
    /// Returns `Store` if storage cannot be read.
    pub async fn pending_verification(&self) -> Result<Option<PendingVerification>, AuthFlowError> {
        Ok(self.store.pending_verification().await?)
    }

    /// Read the code deadline for `email`, starting a fresh 30 minute window
    /// when none is stored. An elapsed deadline is cleared.
    ///
    /// # Errors
    ///
    /// Returns `Store` if storage cannot be read or written.
    pub async fn verification_timer(&self, email: &str) -> Result<VerificationTimer, AuthFlowError> {
        let email = normalize_email(email);
        let now = self.store.clock().unix_secs();
        match self.store.verification_deadline(&email).await? {
            Some(deadline) => {
                let seconds_left = seconds_remaining(deadline, now);
                if seconds_left == 0 {
                    self.store.clear_verification_deadline(&email).await?;
                }
                Ok(VerificationTimer {
                    seconds_left,
                    can_resend: seconds_left == 0,
                })
            }
            None => {
                self.store
                    .set_verification_deadline(&email, now + CODE_TTL_SECS)
                    .await?;
                Ok(VerificationTimer {
                    seconds_left: CODE_TTL_SECS,
                    can_resend: false,
                })
            }
        }
    }

    /// Submit the five-digit code.
    ///
    /// # Errors
    ///
    /// `IncompleteCode` before all digits are in, `CodeExpired` when the
    /// server says the code ran out, `Rejected` for any other refusal.
    pub async fn verify(
        &self,
        email: &str,
        code: &VerificationCode,
    ) -> Result<VerifyOutcome, AuthFlowError> {
        let code = code.code().ok_or(AuthFlowError::IncompleteCode)?;
        let email = normalize_email(email);

        match self.api.verify_email(&email, &code).await {
            Ok(ack)
                if ack.success
                    || ack
                        .message
                        .as_deref()
                        .is_some_and(|message| message.contains("successfully")) =>
            {
                self.store.clear_verification_deadline(&email).await?;
                tracing::info!("email verified");
                Ok(VerifyOutcome::Verified {
                    message: MSG_VERIFIED,
                })
            }
            Ok(ack) => Err(AuthFlowError::Rejected(
                ack.message.unwrap_or_else(|| MSG_INVALID_CODE.to_string()),
            )),
            Err(err) => {
                let message = server_text(&err, MSG_INVALID_CODE);
                if is_already_verified(&message) {
                    self.store.clear_verification_deadline(&email).await?;
                    return Ok(VerifyOutcome::AlreadyVerified {
                        message: MSG_ALREADY_VERIFIED,
                    });
                }
                if mentions_expired(&message) {
                    self.store.clear_verification_deadline(&email).await?;
                    return Err(AuthFlowError::CodeExpired(message));
                }
                Err(AuthFlowError::Rejected(message))
            }
        }
    }

    /// Seconds until another code may be requested for `email`.
    #[must_use]
    pub fn resend_cooldown(&self, email: &str) -> i64 {
        let now = self.store.clock().unix_secs();
        self.cooldowns()
            .get(&normalize_email(email))
            .map_or(0, |until| seconds_remaining(*until, now))
    }

    /// Ask for a new code. Restarts the 30 minute window and blocks further
    /// requests for 60 seconds.
    ///
    /// # Errors
    ///
    /// `Cooldown` inside the 60 second window, `Rejected` when the server
    /// refuses, `Store` if the deadline cannot be written.
    pub async fn resend(&self, email: &str) -> Result<&'static str, AuthFlowError> {
        let remaining = self.resend_cooldown(email);
        if remaining > 0 {
            return Err(AuthFlowError::Cooldown(remaining));
        }
        let email = normalize_email(email);

        let ack = self
            .api
            .resend_verification(&email)
            .await
            .map_err(|err| AuthFlowError::Rejected(server_text(&err, MSG_RESEND_FAILED)))?;
        if !ack.success {
            return Err(AuthFlowError::Rejected(
                ack.message.unwrap_or_else(|| MSG_RESEND_FAILED.to_string()),
            ));
        }

        let now = self.store.clock().unix_secs();
        self.store
            .set_verification_deadline(&email, now + CODE_TTL_SECS)
            .await?;
        self.cooldowns().insert(email, now + RESEND_COOLDOWN_SECS);
        Ok(MSG_CODE_RESENT)
    }

    /// # Errors
    ///
    /// `Invalid` for a bad email, `Rejected` when the server refuses.
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthFlowError> {
        let errors = validate_email_only(email);
        if !errors.is_empty() {
            return Err(AuthFlowError::Invalid(errors));
        }
        let ack = self
            .api
            .forgot_password(&normalize_email(email))
            .await
            .map_err(|err| AuthFlowError::Rejected(code_or(&err, MSG_GENERIC_FAILURE)))?;
        if !ack.success {
            return Err(AuthFlowError::Rejected(MSG_GENERIC_FAILURE.to_string()));
        }
        Ok(ack
            .message
            .unwrap_or_else(|| MSG_RESET_LINK_SENT.to_string()))
    }

    /// Set a new password with the token from the reset email.
    ///
    /// # Errors
    ///
    /// `Rejected` without a token or when the server refuses for a reason
    /// other than a bad token, `Invalid` for bad fields.
    pub async fn reset_password(
        &self,
        token: Option<&str>,
        password: &str,
        confirm: &str,
    ) -> Result<ResetOutcome, AuthFlowError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthFlowError::Rejected(MSG_RESET_TOKEN_MISSING.to_string()))?;
        let errors = validate_reset(token, password, confirm);
        if !errors.is_empty() {
            return Err(AuthFlowError::Invalid(errors));
        }

        match self.api.reset_password(token, password).await {
            Ok(ack) if ack.success => Ok(ResetOutcome::Done {
                message: ack.message.unwrap_or_else(|| MSG_PASSWORD_RESET.to_string()),
            }),
            Ok(_) => Err(AuthFlowError::Rejected(MSG_GENERIC_FAILURE.to_string())),
            Err(err) if err.status() == Some(400) => Ok(ResetOutcome::LinkExpired {
                message: code_or(&err, MSG_GENERIC_FAILURE),
            }),
            Err(err) => Err(AuthFlowError::Rejected(code_or(&err, MSG_GENERIC_FAILURE))),
        }
    }

    /// # Errors
    ///
    /// Returns `Api` if the profile cannot be fetched.
    pub async fn profile(&self) -> Result<Option<AuthUser>, AuthFlowError> {
        Ok(self.api.profile().await?.user)
    }

    /// # Errors
    ///
    /// Returns `Store` if credentials cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthFlowError> {
        self.store.logout().await?;
        tracing::info!("signed out");
        Ok(())
    }

    fn cooldowns(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.resend_blocked_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The body's `error`, then `message`, then `fallback`.
fn server_text(err: &ApiError, fallback: &str) -> String {
    err.server_code()
        .or_else(|| err.server_message())
        .unwrap_or(fallback)
        .to_string()
}

fn code_or(err: &ApiError, fallback: &str) -> String {
    err.server_code().unwrap_or(fallback).to_string()
}
