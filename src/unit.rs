//! Time units a measurement can be reported in

use crate::error::TimerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Reporting unit
///
/// The textual labels (`sec`, `milis`, `nano`) are the ones accepted on the
/// command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "sec")]
    Seconds,
    #[default]
    #[serde(rename = "milis")]
    Milliseconds,
    #[serde(rename = "nano")]
    Nanoseconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 3] = [
        TimeUnit::Seconds,
        TimeUnit::Milliseconds,
        TimeUnit::Nanoseconds,
    ];

    /// Short selector label
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "sec",
            TimeUnit::Milliseconds => "milis",
            TimeUnit::Nanoseconds => "nano",
        }
    }

    /// Word printed after the count in a report line
    pub fn word(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "miliseconds",
            TimeUnit::Nanoseconds => "nanoseconds",
        }
    }

    /// Whole units contained in `elapsed`, remainder discarded
    #[inline]
    pub fn count(self, elapsed: Duration) -> u128 {
        match self {
            TimeUnit::Seconds => elapsed.as_secs() as u128,
            TimeUnit::Milliseconds => elapsed.as_millis(),
            TimeUnit::Nanoseconds => elapsed.as_nanos(),
        }
    }

    /// Parse a label, falling back to milliseconds for anything unrecognised.
    ///
    /// Prefer `str::parse`, which rejects typos instead of hiding them.
    pub fn from_label_lossy(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            warn!(label, "unrecognised time unit, falling back to milis");
            TimeUnit::Milliseconds
        })
    }
}

impl FromStr for TimeUnit {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.label() == s)
            .ok_or_else(|| TimerError::UnknownUnit(s.to_string()))
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
