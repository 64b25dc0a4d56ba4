//! Timestamp source.

use chrono::{SecondsFormat, Utc};

/// Supplies the current time as an ISO-8601 string.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time, e.g. `2024-05-01T08:30:00.000Z`.
    fn now(&self) -> String;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// A clock that always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    pub fn new(instant: impl Into<String>) -> Self {
        Self(instant.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn system_clock_format() {
        let now = SystemClock.now();
        assert!(now.ends_with('Z'));
        // 2024-05-01T08:30:00.000Z
        assert_eq!(now.len(), 24);
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn fixed_clock() {
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        assert_eq!(clock.now(), "2024-01-01T00:00:00.000Z");
        assert_eq!(clock.now(), clock.now());
    }
}
