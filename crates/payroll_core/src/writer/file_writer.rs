//! Output file writer.
//!
//! # Responsibility
//! - Persist ordered record lines to the configured output path.
//!
//! # Invariants
//! - Lines are separated by `\n`; there is no trailing newline after the last line.
//! - The target is replaced by rename, never written in place, so readers see
//!   either the previous file or the complete new one.
//! - File handles are released on every exit path.

use log::{error, info};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const LINE_SEPARATOR: &[u8] = b"\n";

/// Writes record lines to one fixed path.
#[derive(Debug, Clone)]
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `lines` and replaces the target file.
    pub fn write<S: AsRef<str>>(&self, lines: &[S]) -> io::Result<()> {
        self.stage(lines)?.commit()
    }

    /// Writes `lines` to a temporary sibling of the target without touching it.
    ///
    /// Dropping the returned `StagedFile` discards the data.
    pub fn stage<S: AsRef<str>>(&self, lines: &[S]) -> io::Result<StagedFile> {
        let started_at = Instant::now();
        let result = self.stage_inner(lines);
        match &result {
            Ok(_) => info!(
                "event=file_stage module=writer status=ok lines={} duration_ms={}",
                lines.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=file_stage module=writer status=error error_code=stage_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn stage_inner<S: AsRef<str>>(&self, lines: &[S]) -> io::Result<StagedFile> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let temp = NamedTempFile::new_in(&dir)?;
        {
            let mut out = BufWriter::new(temp.as_file());
            for (index, line) in lines.iter().enumerate() {
                if index > 0 {
                    out.write_all(LINE_SEPARATOR)?;
                }
                out.write_all(line.as_ref().as_bytes())?;
            }
            out.flush()?;
        }
        temp.as_file().sync_all()?;

        Ok(StagedFile {
            temp,
            target: self.path.clone(),
        })
    }
}

/// Fully written output waiting to replace the target file.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically moves the staged data over the target path.
    pub fn commit(self) -> io::Result<()> {
        let target = self.target;
        match self.temp.persist(&target) {
            Ok(_) => {
                info!(
                    "event=file_commit module=writer status=ok path={}",
                    target.display()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=file_commit module=writer status=error error_code=persist_failed path={} error={}",
                    target.display(),
                    err.error
                );
                Err(err.error)
            }
        }
    }
}
