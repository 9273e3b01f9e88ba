//! Time source for document and record timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// Supplies "now" to the store; swapped out in tests for deterministic stamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Formats as ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
