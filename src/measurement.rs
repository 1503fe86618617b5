//! Result of one timed block

use crate::unit::TimeUnit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Printed after a seconds report that reads 0 or 1
pub const ADVISORY: &str = "Friendly reminder: consider timing your code at a higher resolution";

/// Default display label of a timed block
pub const DEFAULT_NAME: &str = "Code";

/// Immutable record of a single timed execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    name: String,
    unit: TimeUnit,
    elapsed: Duration,
    completed: bool,
}

impl Measurement {
    pub fn new(name: impl Into<String>, unit: TimeUnit, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            unit,
            elapsed,
            completed: true,
        }
    }

    /// Measurement of a block that unwound instead of returning
    pub(crate) fn unwound(name: impl Into<String>, unit: TimeUnit, elapsed: Duration) -> Self {
        Self {
            completed: false,
            ..Self::new(name, unit, elapsed)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Raw elapsed time at full clock resolution
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in whole `unit`s
    pub fn value(&self) -> u128 {
        self.unit.count(self.elapsed)
    }

    /// False when the timed block panicked
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Seconds are too coarse when the reading is 0 or 1
    pub fn needs_advisory(&self) -> bool {
        self.unit == TimeUnit::Seconds && self.value() <= 1
    }
}

/// `["<name>" execution time: <value> <unit-word>]`
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[\"{}\" execution time: {} {}]",
            self.name,
            self.value(),
            self.unit.word()
        )
    }
}
