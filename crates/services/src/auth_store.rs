//! The single owner of authentication state.
//!
//! Every credential read and write goes through [`AuthStore`], so the rest
//! of the app sees one consistent snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use navi_core::Clock;
use navi_core::auth::{AuthSnapshot, AuthUser, is_token_expired};
use navi_core::verification::PendingVerification;
use storage::repository::{Storage, StorageScope, keys};
use tokio::sync::broadcast;

use crate::error::AuthStoreError;

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const REDIRECT_DELAY: Duration = Duration::from_secs(1);

/// Broadcast to every screen that cares about authentication changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    /// Show a transient notice.
    SessionExpired { message: String },
    /// Navigate to the login screen.
    RedirectToLogin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// First expiry since the last login; a redirect has been scheduled.
    RedirectScheduled,
    /// A redirect is already pending; credentials were cleared again.
    AlreadyHandled,
}

pub struct AuthStore {
    storage: Storage,
    clock: Clock,
    state: RwLock<AuthSnapshot>,
    redirect_armed: AtomicBool,
    redirect_delay: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthStore {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            storage,
            clock,
            state: RwLock::new(AuthSnapshot::default()),
            redirect_armed: AtomicBool::new(true),
            redirect_delay: REDIRECT_DELAY,
            events,
        }
    }

    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Load credentials from storage, preferring the persistent scope.
    ///
    /// An expired or undecodable token, or a missing/unreadable user, leaves
    /// the store signed out and wipes the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be read or cleared.
    pub async fn initialize(&self) -> Result<AuthSnapshot, AuthStoreError> {
        let token = self.storage.get_preferring_persistent(keys::TOKEN).await?;
        let user = self
            .storage
            .get_preferring_persistent(keys::USER_INFO)
            .await?
            .and_then(|raw| match serde_json::from_str::<AuthUser>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding unreadable stored user info");
                    None
                }
            });
        let remember_me = self
            .storage
            .persistent
            .get(keys::REMEMBER_ME)
            .await?
            .is_some_and(|value| value == "true");

        let snapshot = match (token, user) {
            (Some(token), Some(user)) if !is_token_expired(&token, self.clock.unix_secs()) => {
                AuthSnapshot::authenticated(token, user, remember_me)
            }
            _ => {
                self.storage
                    .remove_everywhere(&keys::CREDENTIAL_KEYS)
                    .await?;
                AuthSnapshot::default()
            }
        };

        tracing::info!(
            authenticated = snapshot.is_authenticated(),
            "auth state initialized"
        );
        self.replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Persist a successful login to exactly one scope.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError` if the user cannot be encoded or storage
    /// cannot be written.
    pub async fn save_auth_token(
        &self,
        token: &str,
        user: AuthUser,
        remember_me: bool,
    ) -> Result<(), AuthStoreError> {
        let scope = if remember_me {
            StorageScope::Persistent
        } else {
            StorageScope::Session
        };
        let user_json = serde_json::to_string(&user)?;

        let other = self.storage.scope(scope.other());
        for key in keys::CREDENTIAL_KEYS {
            other.remove(key).await?;
        }
        let target = self.storage.scope(scope);
        target.set(keys::TOKEN, token).await?;
        target.set(keys::USER_INFO, &user_json).await?;
        target
            .set(keys::REMEMBER_ME, if remember_me { "true" } else { "false" })
            .await?;

        self.replace(AuthSnapshot::authenticated(
            token.to_string(),
            user,
            remember_me,
        ));
        self.redirect_armed.store(true, Ordering::SeqCst);
        let _ = self.events.send(AuthEvent::SignedIn);
        Ok(())
    }

    /// Clear every credential key from both scopes.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be written.
    pub async fn logout(&self) -> Result<(), AuthStoreError> {
        self.storage
            .remove_everywhere(&keys::CREDENTIAL_KEYS)
            .await?;
        self.replace(AuthSnapshot::default());
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    /// Handle a 401 on an authenticated request.
    ///
    /// Credentials are always cleared. Only the first expiry since the last
    /// login announces itself and schedules the login redirect.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be written.
    pub async fn expire_session(&self) -> Result<ExpiryOutcome, AuthStoreError> {
        let first = self.redirect_armed.swap(false, Ordering::SeqCst);
        self.storage
            .remove_everywhere(&keys::CREDENTIAL_KEYS)
            .await?;
        self.replace(AuthSnapshot::default());

        if !first {
            return Ok(ExpiryOutcome::AlreadyHandled);
        }

        tracing::warn!("session expired; redirecting to login");
        let _ = self.events.send(AuthEvent::SessionExpired {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        });

        let events = self.events.clone();
        let delay = self.redirect_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(AuthEvent::RedirectToLogin);
                });
            }
            Err(_) => {
                let _ = events.send(AuthEvent::RedirectToLogin);
            }
        }
        Ok(ExpiryOutcome::RedirectScheduled)
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Remember a signup awaiting verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError` if the record cannot be stored.
    pub async fn record_pending_verification(
        &self,
        email: &str,
        first_name: &str,
    ) -> Result<(), AuthStoreError> {
        let record = PendingVerification {
            email: email.to_string(),
            first_name: first_name.to_string(),
            timestamp: self.clock.unix_millis(),
        };
        self.storage
            .persistent
            .set(keys::PENDING_VERIFICATION, &serde_json::to_string(&record)?)
            .await?;
        Ok(())
    }

    /// The pending signup, if one was recorded in the last ten minutes.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be read.
    pub async fn pending_verification(
        &self,
    ) -> Result<Option<PendingVerification>, AuthStoreError> {
        let raw = self.storage.persistent.get(keys::PENDING_VERIFICATION).await?;
        Ok(raw
            .and_then(|raw| serde_json::from_str::<PendingVerification>(&raw).ok())
            .filter(|record| record.is_fresh(self.clock.unix_millis())))
    }

    /// Unix-seconds deadline of the code last sent to `email`.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be read.
    pub async fn verification_deadline(&self, email: &str) -> Result<Option<i64>, AuthStoreError> {
        let raw = self
            .storage
            .persistent
            .get(&keys::verification_expiry(email))
            .await?;
        Ok(raw.and_then(|raw| raw.trim().parse::<i64>().ok()))
    }

    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be written.
    pub async fn set_verification_deadline(
        &self,
        email: &str,
        deadline: i64,
    ) -> Result<(), AuthStoreError> {
        self.storage
            .persistent
            .set(&keys::verification_expiry(email), &deadline.to_string())
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthStoreError::Storage` if storage cannot be written.
    pub async fn clear_verification_deadline(&self, email: &str) -> Result<(), AuthStoreError> {
        self.storage
            .persistent
            .remove(&keys::verification_expiry(email))
            .await?;
        Ok(())
    }

    fn replace(&self, snapshot: AuthSnapshot) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
