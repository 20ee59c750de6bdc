//! Email verification helpers: the five-slot code entry, the expiry and
//! resend countdowns, and the pending-signup record.

use serde::{Deserialize, Serialize};

pub const CODE_LENGTH: usize = 5;
/// A freshly issued code is valid for 30 minutes.
pub const CODE_TTL_SECS: i64 = 30 * 60;
pub const RESEND_COOLDOWN_SECS: i64 = 60;
/// A pending-signup record older than this is ignored.
pub const PENDING_TTL_MILLIS: i64 = 10 * 60 * 1000;

/// The digits typed so far, one slot per digit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationCode {
    slots: [Option<char>; CODE_LENGTH],
}

impl VerificationCode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle input into slot `index`.
    ///
    /// A single digit (or empty string) replaces that slot. Longer input is
    /// treated as a paste: its digits fill `index` and the following slots.
    /// Returns the slot that should receive focus next.
    pub fn input(&mut self, index: usize, raw: &str) -> usize {
        if index >= CODE_LENGTH {
            return CODE_LENGTH - 1;
        }
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (None, _) => {
                self.slots[index] = None;
                index
            }
            (Some(digit), None) if digit.is_ascii_digit() => {
                self.slots[index] = Some(digit);
                (index + 1).min(CODE_LENGTH - 1)
            }
            (Some(_), None) => index,
            _ => {
                let digits: Vec<char> = raw
                    .chars()
                    .filter(char::is_ascii_digit)
                    .take(CODE_LENGTH - index)
                    .collect();
                for (offset, digit) in digits.iter().enumerate() {
                    self.slots[index + offset] = Some(*digit);
                }
                (index + digits.len()).min(CODE_LENGTH - 1)
            }
        }
    }

    /// Replace the whole code from pasted text. Only a paste holding at
    /// least five digits is accepted.
    pub fn paste(&mut self, raw: &str) -> bool {
        let digits: Vec<char> = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(CODE_LENGTH)
            .collect();
        if digits.len() != CODE_LENGTH {
            return false;
        }
        for (slot, digit) in self.slots.iter_mut().zip(digits) {
            *slot = Some(digit);
        }
        true
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<char> {
        self.slots.get(index).copied().flatten()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The full code, once every slot holds a digit.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect::<Option<String>>()
    }

    pub fn clear(&mut self) {
        self.slots = [None; CODE_LENGTH];
    }
}

/// `m:ss`, as shown next to the code inputs.
#[must_use]
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Seconds left before `deadline`, never negative.
#[must_use]
pub fn seconds_remaining(deadline_unix_secs: i64, now_unix_secs: i64) -> i64 {
    (deadline_unix_secs - now_unix_secs).max(0)
}

/// Written after signup so the verify screen can pick the email back up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl PendingVerification {
    #[must_use]
    pub fn is_fresh(&self, now_unix_millis: i64) -> bool {
        now_unix_millis - self.timestamp < PENDING_TTL_MILLIS
    }
}

/// The backend reports an already-verified account only in free text.
#[must_use]
pub fn is_already_verified(message: &str) -> bool {
    message.contains("already verified")
}

#[must_use]
pub fn mentions_expired(message: &str) -> bool {
    message.contains("expired")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_digits_moves_focus_forward() {
        let mut code = VerificationCode::new();
        assert_eq!(code.input(0, "1"), 1);
        assert_eq!(code.input(1, "x"), 1);
        assert_eq!(code.slot(1), None);
        assert_eq!(code.input(1, "2"), 2);
        assert_eq!(code.code(), None);
    }

    #[test]
    fn multi_digit_input_fills_following_slots() {
        let mut code = VerificationCode::new();
        let focus = code.input(1, "9a87654");
        assert_eq!(focus, 4);
        assert_eq!(code.slot(0), None);
        assert_eq!(code.slot(1), Some('9'));
        assert_eq!(code.slot(4), Some('6'));
        code.input(0, "1");
        assert_eq!(code.code().as_deref(), Some("19876"));
    }

    #[test]
    fn paste_requires_five_digits() {
        let mut code = VerificationCode::new();
        assert!(!code.paste("12-3"));
        assert!(code.paste("12-345-6"));
        assert_eq!(code.code().as_deref(), Some("12345"));
        code.clear();
        assert!(!code.is_complete());
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(65), "1:05");
        assert_eq!(format_countdown(-3), "0:00");
        assert_eq!(seconds_remaining(100, 160), 0);
    }

    #[test]
    fn pending_record_expires_after_ten_minutes() {
        let record = PendingVerification {
            email: "a@b.co".into(),
            first_name: "A".into(),
            timestamp: 1_000,
        };
        assert!(record.is_fresh(1_000 + PENDING_TTL_MILLIS - 1));
        assert!(!record.is_fresh(1_000 + PENDING_TTL_MILLIS));
    }

    #[test]
    fn message_classifiers() {
        assert!(is_already_verified("Email is already verified"));
        assert!(mentions_expired("Verification code expired"));
        assert!(!is_already_verified("Invalid code"));
    }
}
