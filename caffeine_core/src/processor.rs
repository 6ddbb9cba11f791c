//! Evaluation of pending sub-doses against the current instant.
//!
//! Each pending event is in exactly one of three positions relative to `now`:
//! - **Future**: deferred unchanged, level untouched
//! - **Present**: merged at full strength
//! - **Past**: decayed for the time since it was due, then merged
//!
//! Zero-amount events are dropped outright.

use crate::decay::{decay, HALF_LIFE_MINUTES};
use crate::types::{format_time, minutes_between};
use crate::{LevelRecord, PendingEvent};
use chrono::NaiveDateTime;
use std::fmt;

/// A sub-dose that was merged into the level
#[derive(Clone, Debug, PartialEq)]
pub struct MergeRecord {
    /// Amount as scheduled
    pub original: f64,
    /// Amount actually added after decay
    pub decayed: f64,
    /// Minutes between when the event was due and the merge
    pub minutes_elapsed: f64,
    /// Level after the merge
    pub level: f64,
    pub time: NaiveDateTime,
}

impl fmt::Display for MergeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} mg added ({:.1} mg, decayed {:.1} mins): level is {:.1} at {}",
            self.decayed,
            self.original,
            self.minutes_elapsed,
            self.level,
            format_time(&self.time)
        )
    }
}

/// Result of evaluating one pending event
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Still due in the future; carry it over
    Deferred(PendingEvent),
    Merged(MergeRecord),
    /// Zero amount, nothing to do
    Dropped,
}

/// Evaluate `event` at `now`, merging it into `record` if it is due
pub fn process_event(record: &mut LevelRecord, event: PendingEvent, now: NaiveDateTime) -> Outcome {
    if event.level == 0.0 {
        return Outcome::Dropped;
    }

    if event.when_to_process > now {
        tracing::debug!(
            "Deferring {:.1} mg until {}",
            event.level,
            format_time(&event.when_to_process)
        );
        return Outcome::Deferred(event);
    }

    let minutes_elapsed = minutes_between(event.when_to_process, now);
    let decayed = if event.when_to_process == now {
        event.level
    } else {
        decay(event.level, minutes_elapsed, HALF_LIFE_MINUTES)
    };

    record.level += decayed;
    record.time = now;

    let merge = MergeRecord {
        original: event.level,
        decayed,
        minutes_elapsed,
        level: record.level,
        time: record.time,
    };
    tracing::info!("{}", merge);

    Outcome::Merged(merge)
}
