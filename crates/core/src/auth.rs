use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The signed-in user as returned by login and stored under `userInfo`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthUser {
    /// Two-letter avatar initials, `"U"` when no name is known.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|name| name.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Consistent view of the authentication state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthSnapshot {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
    pub remember_me: bool,
}

impl AuthSnapshot {
    #[must_use]
    pub fn authenticated(token: String, user: AuthUser, remember_me: bool) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            remember_me,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    #[must_use]
    pub fn initials(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| "U".to_string(), AuthUser::initials)
    }
}

/// Outcome of reading the `exp` claim from a JWT payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenExpiry {
    /// Expires at the given unix second.
    At(i64),
    /// Decodes, but carries no numeric `exp`.
    Never,
    /// Not a decodable JWT.
    Malformed,
}

/// Read the expiry claim without verifying the signature.
#[must_use]
pub fn decode_expiry(token: &str) -> TokenExpiry {
    let Some(payload) = token.split('.').nth(1) else {
        return TokenExpiry::Malformed;
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(payload));
    let Ok(bytes) = bytes else {
        return TokenExpiry::Malformed;
    };
    let Ok(Value::Object(claims)) = serde_json::from_slice::<Value>(&bytes) else {
        return TokenExpiry::Malformed;
    };
    match claims.get("exp").and_then(Value::as_f64) {
        #[allow(clippy::cast_possible_truncation)]
        Some(exp) => TokenExpiry::At(exp.floor() as i64),
        None => TokenExpiry::Never,
    }
}

/// `true` for a token whose `exp` is in the past and for any token that
/// cannot be decoded.
#[must_use]
pub fn is_token_expired(token: &str, now_unix_secs: i64) -> bool {
    match decode_expiry(token) {
        TokenExpiry::At(exp) => exp < now_unix_secs,
        TokenExpiry::Never => false,
        TokenExpiry::Malformed => true,
    }
}

/// Field name to message, ordered for stable rendering.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

fn looks_like_email(email: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// Trim and lower-case an email before it is sent anywhere.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !looks_like_email(email) {
        errors.insert("email", "Please enter a valid email");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < 6 {
        errors.insert("password", "Password must be at least 6 characters");
    }
}

#[must_use]
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(email, &mut errors);
    check_password(password, &mut errors);
    errors
}

#[must_use]
pub fn validate_signup(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if first_name.trim().is_empty() {
        errors.insert("firstName", "First name is required");
    }
    if last_name.trim().is_empty() {
        errors.insert("lastName", "Last name is required");
    }
    check_email(email, &mut errors);
    check_password(password, &mut errors);
    errors
}

#[must_use]
pub fn validate_email_only(email: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(email, &mut errors);
    errors
}

#[must_use]
pub fn validate_reset(token: &str, password: &str, confirm: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if token.trim().is_empty() {
        errors.insert("token", "Reset token is required");
    }
    check_password(password, &mut errors);
    if confirm.is_empty() {
        errors.insert("confirmPassword", "Please confirm your password");
    } else if confirm != password {
        errors.insert("confirmPassword", "Passwords do not match");
    }
    errors
}
