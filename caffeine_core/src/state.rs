//! Level record persistence with file locking.
//!
//! The current-state file holds a single `{time, level}` record. It is read
//! once at the start of a run and replaced in full at the end.

use crate::decay::decay_between;
use crate::{Error, LevelRecord, Result};
use chrono::NaiveDateTime;
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Outcome of reading the level record
#[derive(Clone, Debug, PartialEq)]
pub enum LoadedLevel {
    /// Nothing stored yet; zero level as of now
    Fresh(LevelRecord),
    /// Record read back from storage
    Stored(LevelRecord),
}

impl LoadedLevel {
    pub fn is_first_run(&self) -> bool {
        matches!(self, LoadedLevel::Fresh(_))
    }

    pub fn into_record(self) -> LevelRecord {
        match self {
            LoadedLevel::Fresh(record) | LoadedLevel::Stored(record) => record,
        }
    }
}

/// Storage seam for the level record
pub trait StateStore {
    fn load(&mut self, now: NaiveDateTime) -> Result<LoadedLevel>;
    fn save(&mut self, record: &LevelRecord) -> Result<()>;
}

/// Decay a stored level forward to `now` and advance its timestamp
pub fn decay_forward(record: &mut LevelRecord, now: NaiveDateTime) {
    let before = record.level;
    record.level = decay_between(record.level, record.time, now);
    tracing::debug!(
        "Decayed level from {:.1} at {} to {:.1} at {}",
        before,
        record.time,
        record.level,
        now
    );
    record.time = now;
}

/// JSON file holding the level record
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateFile {
    /// Read the record under a shared lock
    ///
    /// A missing, empty or malformed file is a first run. Failing to open
    /// or read an existing file is an error.
    fn load(&mut self, now: NaiveDateTime) -> Result<LoadedLevel> {
        if !self.path.exists() {
            tracing::info!("No state file at {:?}, starting from zero", self.path);
            return Ok(LoadedLevel::Fresh(LevelRecord::fresh(now)));
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            tracing::info!("State file {:?} is empty, starting from zero", self.path);
            return Ok(LoadedLevel::Fresh(LevelRecord::fresh(now)));
        }

        let record: LevelRecord = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Starting from zero.",
                    self.path,
                    e
                );
                return Ok(LoadedLevel::Fresh(LevelRecord::fresh(now)));
            }
        };
        tracing::debug!("Loaded level {:.1} at {} from {:?}", record.level, record.time, self.path);
        Ok(LoadedLevel::Stored(record))
    }

    /// Atomically replace the state file by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, record: &LevelRecord) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::State(format!("State path {:?} has no parent", self.path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, record)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("level is {:.1} at {}", record.level, record.time);
        Ok(())
    }
}
