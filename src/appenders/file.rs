//! The log file handle owned by a logger

use crate::core::{LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An open log file
///
/// Writes are unbuffered: each line is a single `write_all` on an append-mode
/// descriptor, so nothing is lost if the process exits without closing.
#[derive(Debug)]
pub(crate) struct LogFile {
    file: File,
    path: PathBuf,
}

impl LogFile {
    /// Create the file if it is missing, otherwise append to it
    pub(crate) fn open(path: &Path, mode: u32) -> Result<Self> {
        let file = open_options(mode)
            .open(path)
            .map_err(|e| LoggerError::io_operation("opening log file", path, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())
    }

    /// Push written data to disk
    pub(crate) fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

/// Options for creating files with the logger's permission mode
pub(crate) fn open_options(mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options
}
