use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The two lifetimes client state can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Survives restarts ("remember me").
    Persistent,
    /// Lives only as long as the process.
    Session,
}

impl StorageScope {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            StorageScope::Persistent => StorageScope::Session,
            StorageScope::Session => StorageScope::Persistent,
        }
    }
}

/// Well-known keys. Values are plain strings; structured values are JSON.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const ROLE: &str = "role";
    pub const USER_INFO: &str = "userInfo";
    pub const REMEMBER_ME: &str = "rememberMe";
    pub const PENDING_VERIFICATION: &str = "pendingVerification";

    /// Every key cleared on logout or session expiry.
    pub const CREDENTIAL_KEYS: [&str; 4] = [TOKEN, ROLE, USER_INFO, REMEMBER_ME];

    /// Key holding the unix-seconds deadline of the code sent to `email`.
    #[must_use]
    pub fn verification_expiry(email: &str) -> String {
        format!("verification_expiry_{email}")
    }
}

/// String key/value store contract, one instance per scope.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Simple in-memory store for tests and for the session scope.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut keys: Vec<String> = guard.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Both scopes behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub persistent: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            persistent: Arc::new(InMemoryStore::new()),
            session: Arc::new(InMemoryStore::new()),
        }
    }

    #[must_use]
    pub fn scope(&self, scope: StorageScope) -> &Arc<dyn KeyValueStore> {
        match scope {
            StorageScope::Persistent => &self.persistent,
            StorageScope::Session => &self.session,
        }
    }

    /// Read `key` from the persistent scope, falling back to the session scope.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either scope cannot be read.
    pub async fn get_preferring_persistent(
        &self,
        key: &str,
    ) -> Result<Option<String>, StorageError> {
        match self.persistent.get(key).await? {
            Some(value) => Ok(Some(value)),
            None => self.session.get(key).await,
        }
    }

    /// Remove `keys` from both scopes.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError` hit; earlier removals are kept.
    pub async fn remove_everywhere(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.persistent.remove(key).await?;
            self.session.remove(key).await?;
        }
        Ok(())
    }
}
