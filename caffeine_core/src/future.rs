//! Deferred sub-doses and their replay.
//!
//! Sub-doses that are not yet due are kept in a JSON array, latest
//! `when_to_process` first. Every run reloads the array, merges whatever has
//! come due, and rewrites the remainder in full.

use crate::processor::{process_event, MergeRecord, Outcome};
use crate::{Error, LevelRecord, PendingEvent, Result};
use chrono::NaiveDateTime;
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage seam for the pending-event list
pub trait FutureStore {
    fn load(&mut self) -> Result<Vec<PendingEvent>>;
    fn save(&mut self, events: &[PendingEvent]) -> Result<()>;
}

/// Result of replaying the pending list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Replay {
    /// Events merged during this replay, in processing order
    pub merged: Vec<MergeRecord>,
    /// Events still in the future, latest first
    pub pending: Vec<PendingEvent>,
}

/// Sort latest `when_to_process` first
///
/// The sort is stable so ties keep their relative order between runs.
pub fn sort_latest_first(events: &mut [PendingEvent]) {
    events.sort_by(|a, b| b.when_to_process.cmp(&a.when_to_process));
}

/// Evaluate every event at `now`, merging due ones into `record`
pub fn replay(record: &mut LevelRecord, mut events: Vec<PendingEvent>, now: NaiveDateTime) -> Replay {
    sort_latest_first(&mut events);

    let mut result = Replay::default();
    for event in events {
        match process_event(record, event, now) {
            Outcome::Deferred(event) => result.pending.push(event),
            Outcome::Merged(merge) => result.merged.push(merge),
            Outcome::Dropped => {}
        }
    }

    sort_latest_first(&mut result.pending);

    tracing::debug!(
        "Replay merged {} sub-doses, {} still pending",
        result.merged.len(),
        result.pending.len()
    );
    result
}

/// JSON file holding the pending-event list
pub struct JsonFutureFile {
    path: PathBuf,
}

impl JsonFutureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FutureStore for JsonFutureFile {
    /// Read the pending list under a shared lock
    ///
    /// A missing, empty, or malformed file yields an empty list with a
    /// warning. Only a file that exists but cannot be opened is an error.
    fn load(&mut self) -> Result<Vec<PendingEvent>> {
        if !self.path.exists() {
            tracing::warn!("No future events file at {:?}, assuming none pending", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read {
            tracing::warn!(
                "Failed to read future events file {:?}: {}. Assuming none pending.",
                self.path,
                e
            );
            return Ok(Vec::new());
        }

        if contents.trim().is_empty() {
            tracing::warn!("Future events file {:?} is empty, assuming none pending", self.path);
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<PendingEvent>>(&contents) {
            Ok(mut events) => {
                sort_latest_first(&mut events);
                tracing::debug!("Loaded {} pending events from {:?}", events.len(), self.path);
                Ok(events)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse future events file {:?}: {}. Assuming none pending.",
                    self.path,
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the file with `events`, latest first
    fn save(&mut self, events: &[PendingEvent]) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            Error::Other(format!("Future events path {:?} has no parent", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        let mut sorted = events.to_vec();
        sort_latest_first(&mut sorted);

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &sorted)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} pending events to {:?}", sorted.len(), self.path);
        Ok(())
    }
}
