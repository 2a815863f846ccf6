//! Size-capped rolling file sink.
//!
//! `tracing-appender` rotates by time only; this module provides the
//! size-bounded policy the platform requires: the active file never grows past
//! `max_bytes`, and at most `max_backups` rotated files are retained.
//!
//! File naming follows the classic scheme: the active file is `<prefix>.log`,
//! backups are `<prefix>.log.1` (newest) through `<prefix>.log.N` (oldest).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub(crate) struct SizeRollingWriter {
    dir: PathBuf,
    prefix: String,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl SizeRollingWriter {
    pub(crate) fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        max_bytes: u64,
        max_backups: usize,
    ) -> io::Result<Self> {
        let dir = dir.into();
        let prefix = prefix.into();
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{prefix}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self { dir, prefix, max_bytes, max_backups, file, written })
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.prefix))
    }

    fn backup_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{n}", self.prefix))
    }

    /// Shifts every backup up by one slot, dropping the oldest, then reopens
    /// a fresh active file.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.backup_path(self.max_backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_backups).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }

        if self.max_backups > 0 {
            fs::rename(self.active_path(), self.backup_path(1))?;
        } else {
            fs::remove_file(self.active_path())?;
        }

        self.file = OpenOptions::new().create(true).append(true).open(self.active_path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A single record larger than the cap is written whole to a fresh
        // file; records are never split across files.
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
