//! Wall-clock entry times.
//!
//! Lets the user say "at 09:30" instead of "150 minutes ago". A time more
//! than two hours ahead of now is taken to mean yesterday.

use crate::{Error, Result};
use chrono::{NaiveDateTime, NaiveTime};

/// How far ahead a wall-clock time may be before it means the previous day
const MAX_FUTURE_MINUTES: i64 = 120;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parse an `HH:MM` wall-clock time
pub fn parse_walltime(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| Error::Walltime(format!("{:?}, expected HH:MM", s)))
}

/// Minutes between `walltime` (today) and `now`, truncated toward zero
pub fn walltime_to_minutes_ago(walltime: NaiveTime, now: NaiveDateTime) -> i64 {
    let entered = now.date().and_time(walltime);
    let elapsed = now - entered;

    let mut minutes = elapsed.num_seconds() / 60;
    if minutes < -MAX_FUTURE_MINUTES {
        minutes += MINUTES_PER_DAY;
    }
    minutes
}
