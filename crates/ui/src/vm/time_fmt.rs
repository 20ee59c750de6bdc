use chrono::{DateTime, Utc};

#[must_use]
pub fn format_clock_time(value: DateTime<Utc>) -> String {
    value.format("%H:%M:%S").to_string()
}
