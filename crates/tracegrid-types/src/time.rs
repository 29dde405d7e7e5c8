//! Simulation time as recorded in event logs.
//!
//! Log records carry timestamps of the form `hh:mm:ss:ms`, optionally
//! followed by a fifth `:r` component holding a sub-millisecond remainder.
//! [`SimTime`] normalizes them to a millisecond count plus remainder so
//! that comparisons are plain integer comparisons.
//!
//! # Design Principles
//!
//! - Ordering is total: milliseconds first, then remainder.
//! - [`SimTime::INFINITY`] sorts after every finite time. It marks an
//!   exhausted stream and the end of the replay.
//! - Arithmetic never overflows silently: sums saturate to infinity.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Errors produced when parsing a textual timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time '{input}': {reason}")]
pub struct TimeParseError {
    /// The rejected text.
    pub input: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl TimeParseError {
    fn new(input: &str, reason: &str) -> Self {
        Self {
            input: input.to_owned(),
            reason: reason.to_owned(),
        }
    }
}

/// A point on the simulation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime {
    /// Whole milliseconds since the start of the simulation.
    millis: u64,
    /// Sub-millisecond remainder, compared after `millis`.
    remainder: u32,
}

impl SimTime {
    /// The start of the simulation, `00:00:00:000`.
    pub const ZERO: Self = Self {
        millis: 0,
        remainder: 0,
    };

    /// Later than every finite time.
    pub const INFINITY: Self = Self {
        millis: u64::MAX,
        remainder: u32::MAX,
    };

    /// Create a time from a whole number of milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            millis,
            remainder: 0,
        }
    }

    /// Create a time from its clock components.
    ///
    /// Returns `None` if the total does not fit in the millisecond counter.
    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        let total = hours
            .checked_mul(MILLIS_PER_HOUR)?
            .checked_add(minutes.checked_mul(MILLIS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MILLIS_PER_SECOND)?)?
            .checked_add(millis)?;
        if total == u64::MAX {
            return None;
        }
        Some(Self::from_millis(total))
    }

    /// Attach a sub-millisecond remainder.
    #[must_use]
    pub const fn with_remainder(self, remainder: u32) -> Self {
        if self.is_infinite() {
            return self;
        }
        Self {
            millis: self.millis,
            remainder,
        }
    }

    /// Whole milliseconds since the start of the simulation.
    pub const fn millis(self) -> u64 {
        self.millis
    }

    /// The sub-millisecond remainder.
    pub const fn remainder(self) -> u32 {
        self.remainder
    }

    /// Whether this is [`SimTime::INFINITY`].
    pub const fn is_infinite(self) -> bool {
        self.millis == u64::MAX
    }

    /// Add two times, saturating to [`SimTime::INFINITY`].
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        if self.is_infinite() || other.is_infinite() {
            return Self::INFINITY;
        }
        let Some(millis) = self.millis.checked_add(other.millis) else {
            return Self::INFINITY;
        };
        if millis == u64::MAX {
            return Self::INFINITY;
        }
        Self {
            millis,
            remainder: self.remainder.saturating_add(other.remainder),
        }
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            return f.write_str("inf");
        }
        let hours = self.millis / MILLIS_PER_HOUR;
        let minutes = (self.millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
        let seconds = (self.millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
        let millis = self.millis % MILLIS_PER_SECOND;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}:{millis:03}")?;
        if self.remainder != 0 {
            write!(f, ":{}", self.remainder)?;
        }
        Ok(())
    }
}

impl FromStr for SimTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("infinity") {
            return Ok(Self::INFINITY);
        }

        let fields: Vec<&str> = text.split(':').collect();
        let (clock, remainder) = match fields.as_slice() {
            [h, m, sec, ms] => ([*h, *m, *sec, *ms], None),
            [h, m, sec, ms, r] => ([*h, *m, *sec, *ms], Some(*r)),
            _ => {
                return Err(TimeParseError::new(
                    s,
                    "expected hh:mm:ss:ms with an optional :remainder",
                ));
            }
        };

        let mut parts = [0_u64; 4];
        for (slot, field) in parts.iter_mut().zip(clock) {
            *slot = field
                .trim()
                .parse()
                .map_err(|_parse| TimeParseError::new(s, "components must be unsigned integers"))?;
        }
        let [hours, minutes, seconds, millis] = parts;
        let time = Self::from_parts(hours, minutes, seconds, millis)
            .ok_or_else(|| TimeParseError::new(s, "time is too large"))?;

        match remainder {
            None => Ok(time),
            Some(r) => {
                let rem: u32 = r
                    .trim()
                    .parse()
                    .map_err(|_parse| TimeParseError::new(s, "remainder must be an unsigned integer"))?;
                Ok(time.with_remainder(rem))
            }
        }
    }
}

impl Serialize for SimTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SimTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
