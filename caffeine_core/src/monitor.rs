//! Per-invocation driver.
//!
//! One run:
//! 1. Read the level record and decay it forward to now (skipped on a first run)
//! 2. Schedule the new consumption into sub-doses
//! 3. Replay the pending list together with the new sub-doses
//! 4. Persist the still-pending sub-doses and the level record

use crate::absorption::schedule_consumption;
use crate::future::{replay, FutureStore};
use crate::processor::MergeRecord;
use crate::state::{decay_forward, StateStore};
use crate::{Consumption, LevelRecord, PendingEvent, Result};
use chrono::NaiveDateTime;
use std::fmt;

/// Outcome of one monitor run
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Level record as written back
    pub record: LevelRecord,
    /// Sub-doses merged during this run
    pub merged: Vec<MergeRecord>,
    /// Sub-doses left for a later run, latest first
    pub pending: Vec<PendingEvent>,
    pub first_run: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.record, f)
    }
}

/// Ties the level record and the pending list together for one run
pub struct CaffeineMonitor<S, F> {
    state: S,
    future: F,
}

impl<S: StateStore, F: FutureStore> CaffeineMonitor<S, F> {
    pub fn new(state: S, future: F) -> Self {
        Self { state, future }
    }

    /// Apply `consumption` at `now` and persist the result
    ///
    /// `first_run` is set by the caller when the stores were only just
    /// created; a record the store reports as fresh counts as a first run
    /// too. Either way there is nothing to decay forward.
    pub fn run(
        &mut self,
        consumption: &Consumption,
        now: NaiveDateTime,
        first_run: bool,
    ) -> Result<Report> {
        let loaded = self.state.load(now)?;
        let first_run = first_run || loaded.is_first_run();
        let mut record = loaded.into_record();

        if !first_run {
            decay_forward(&mut record, now);
        }

        let mut events = self.future.load()?;
        if consumption.mg != 0 {
            tracing::info!(
                "Entered {} mg of {}, {} mins ago",
                consumption.mg,
                consumption.beverage,
                consumption.mins_ago
            );
            events.extend(schedule_consumption(consumption, now)?);
        }

        let outcome = replay(&mut record, events, now);
        record.time = now;

        self.future.save(&outcome.pending)?;
        self.state.save(&record)?;

        Ok(Report {
            record,
            merged: outcome.merged,
            pending: outcome.pending,
            first_run,
        })
    }

    pub fn into_stores(self) -> (S, F) {
        (self.state, self.future)
    }
}
