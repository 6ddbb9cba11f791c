//! Core domain types for the caffeine monitor.
//!
//! This module defines the fundamental types used throughout the system:
//! - Beverages and consumption entries
//! - The persisted level record
//! - Pending (not yet absorbed) sub-doses

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format used for every persisted and displayed timestamp
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp the way it is stored on disk
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp in [`TIME_FORMAT`]
pub fn parse_time(s: &str) -> crate::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| crate::Error::Other(format!("Invalid timestamp {:?}: {}", s, e)))
}

/// Fractional minutes from `from` to `to` (negative if `to` is earlier)
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let elapsed = to - from;
    elapsed.num_milliseconds() as f64 / 60_000.0
}

/// Serde adapter for `NaiveDateTime` in [`TIME_FORMAT`]
pub(crate) mod time_format {
    use super::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Beverages
// ============================================================================

/// Kind of caffeinated beverage consumed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Beverage {
    #[default]
    Coffee,
    Soda,
    Chocolate,
}

impl Beverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Beverage::Coffee => "coffee",
            Beverage::Soda => "soda",
            Beverage::Chocolate => "chocolate",
        }
    }
}

impl fmt::Display for Beverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Beverage {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "coffee" => Ok(Beverage::Coffee),
            "soda" => Ok(Beverage::Soda),
            "chocolate" => Ok(Beverage::Chocolate),
            other => Err(crate::Error::Config(format!(
                "Unknown beverage {:?} (expected coffee, soda, or chocolate)",
                other
            ))),
        }
    }
}

/// One user-entered consumption, as supplied by the command line
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Consumption {
    /// Total mg consumed (0 means report only; negative retracts)
    pub mg: i64,
    /// Minutes before now the beverage was consumed (negative = future)
    pub mins_ago: i64,
    pub beverage: Beverage,
}

impl Consumption {
    /// Instant the consumption was entered for
    ///
    /// Fails when `mins_ago` puts the instant outside the representable range.
    pub fn entered_at(&self, now: NaiveDateTime) -> crate::Result<NaiveDateTime> {
        Duration::try_minutes(self.mins_ago)
            .and_then(|offset| now.checked_sub_signed(offset))
            .ok_or_else(|| {
                crate::Error::Other(format!(
                    "{} minutes ago is out of range for a consumption time",
                    self.mins_ago
                ))
            })
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// Current caffeine level and the instant it is valid as of
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelRecord {
    #[serde(with = "time_format")]
    pub time: NaiveDateTime,
    pub level: f64,
}

impl LevelRecord {
    /// Zero level as of `now`, used on a first run
    pub fn fresh(now: NaiveDateTime) -> Self {
        Self { time: now, level: 0.0 }
    }
}

impl fmt::Display for LevelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Caffeine level is {:.1} mg at time {}",
            self.level,
            format_time(&self.time)
        )
    }
}

/// A sub-dose that has not yet been merged into the level
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PendingEvent {
    /// Instant the sub-dose is to be merged
    #[serde(with = "time_format")]
    pub when_to_process: NaiveDateTime,
    /// Instant the consumption was entered for
    #[serde(with = "time_format")]
    pub time_entered: NaiveDateTime,
    /// Sub-dose in mg
    pub level: f64,
}
