//! Append-only activity log and first-run store bootstrap.
//!
//! The activity log is a plain-text record of every merge, written by the
//! tracing journal layer (see [`crate::logging::init_with_journal`]).
//! Lines are only ever appended, under an exclusive lock.

use crate::config::StorePaths;
use crate::future::{FutureStore, JsonFutureFile};
use crate::state::{JsonStateFile, StateStore};
use crate::{LevelRecord, Result};
use chrono::NaiveDateTime;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// First line of every activity log
pub const LOG_HEADER: &str = "Start of log file";

/// Append-only handle on the activity log
#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    file: File,
}

impl ActivityLog {
    /// Open (creating if needed) the log for appending
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        self.file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&self.file);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        self.file.unlock()?;
        Ok(())
    }
}

impl Write for ActivityLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.lock_exclusive()?;
        let written = self.file.write(buf);
        self.file.unlock()?;
        written
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

/// Read the activity log back, one entry per line
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let lines = BufReader::new(&file).lines().collect::<std::io::Result<Vec<_>>>();
    file.unlock()?;
    Ok(lines?)
}

/// Create the stores for a first run
///
/// A first run is one where the state file is missing or empty. It writes
/// a zero level as of `now`, replaces any old activity log with a fresh one,
/// and creates an empty future file if there is none. Returns whether this
/// was a first run.
pub fn prepare_stores(paths: &StorePaths, now: NaiveDateTime) -> Result<bool> {
    let first_run = match std::fs::metadata(&paths.state) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if !first_run {
        return Ok(false);
    }

    tracing::info!("First run, initialising stores in {:?}", paths.state.parent());

    JsonStateFile::new(&paths.state).save(&LevelRecord::fresh(now))?;

    match std::fs::remove_file(&paths.log) {
        Ok(()) => tracing::debug!("Removed old activity log {:?}", paths.log),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    ActivityLog::open(&paths.log)?.append_line(LOG_HEADER)?;

    if !paths.future.exists() {
        JsonFutureFile::new(&paths.future).save(&[])?;
    }

    Ok(true)
}
