//! Log rotation
//!
//! Rotation archives the active file under a dated name and reopens a fresh
//! file at the original path:
//!
//! ```text
//! app.log            -> app.log.2025-01-08      (first rotation of the day)
//! app.log            -> app.log.2025-01-08-1    (second)
//! app.log.2025-01-08 -> app.log.2025-01-08.gz   (when gzip is enabled)
//! ```
//!
//! The caller holds the logger's file lock for the whole sequence, so no write
//! can land between closing the old file and opening the new one.

use super::file::{open_options, LogFile};
use crate::core::config::is_null_device;
use crate::core::logger::report;
use crate::core::timestamp::format_archive_date;
use crate::core::{LoggerError, Result};
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Give up looking for a free archive name after this many same-day suffixes
const MAX_SAME_DAY_SUFFIX: u32 = 10_000;

/// Result of a completed rotation
#[derive(Debug)]
pub struct RotatedFile {
    /// Where the archived log ended up (`.gz` when compression succeeded)
    pub path: PathBuf,
    /// Set when gzip was requested and failed; the archive is then left
    /// uncompressed at `path`
    pub compression_error: Option<LoggerError>,
}

impl RotatedFile {
    pub fn is_compressed(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "gz")
    }
}

/// First unused archive name for `base` on `date`
///
/// A name counts as used when either it or its `.gz` sibling exists.
pub fn archive_path(base: &Path, date: NaiveDate) -> Result<PathBuf> {
    let dated = append_to_path(base, &format!(".{}", format_archive_date(date)));
    if !is_taken(&dated) {
        return Ok(dated);
    }

    for suffix in 1..=MAX_SAME_DAY_SUFFIX {
        let candidate = append_to_path(&dated, &format!("-{}", suffix));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(LoggerError::file_rotation(
        base,
        format!("no unused archive name after {} attempts", MAX_SAME_DAY_SUFFIX),
    ))
}

/// Rotate the file held in `slot`
///
/// Returns `Ok(None)` when nothing is open or the file is the null device.
/// On a failure after the old file was closed, `slot` is left empty.
pub(crate) fn rotate(
    slot: &mut Option<LogFile>,
    mode: u32,
    compress: bool,
    date: NaiveDate,
) -> Result<Option<RotatedFile>> {
    let Some(current) = slot.as_ref() else {
        return Ok(None);
    };
    if is_null_device(current.path()) {
        return Ok(None);
    }

    let base = current.path().to_path_buf();
    let archive = archive_path(&base, date)?;

    if let Some(mut current) = slot.take() {
        current.sync().map_err(|e| {
            LoggerError::io_operation("flushing log file before rotation", &base, e)
        })?;
        // Dropping the handle closes it before the rename
    }

    fs::rename(&base, &archive)
        .map_err(|e| LoggerError::io_operation("renaming log file for rotation", &base, e))?;

    *slot = Some(LogFile::open(&base, mode)?);

    if !compress {
        return Ok(Some(RotatedFile {
            path: archive,
            compression_error: None,
        }));
    }

    match compress_file(&archive, mode) {
        Ok(gz_path) => Ok(Some(RotatedFile {
            path: gz_path,
            compression_error: None,
        })),
        Err(e) => {
            report(format_args!(
                "[LOGGER WARNING] Failed to compress rotated log {}: {}. \
                 Archive left uncompressed.",
                archive.display(),
                e
            ));
            Ok(Some(RotatedFile {
                path: archive,
                compression_error: Some(e),
            }))
        }
    }
}

/// Gzip `path` to `<path>.gz`, removing the original on success
///
/// Data is streamed through a temporary file so a failed compression never
/// leaves a truncated `.gz` behind, and the original is only removed after
/// the compressed copy is complete.
fn compress_file(path: &Path, mode: u32) -> Result<PathBuf> {
    let gz_path = append_to_path(path, ".gz");
    let temp_gz_path = append_to_path(path, ".gz.tmp");

    let input = File::open(path)
        .map_err(|e| LoggerError::io_operation("opening rotated log for compression", path, e))?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = open_options(mode)
        .truncate(true)
        .append(false)
        .write(true)
        .open(&temp_gz_path)
        .map_err(|e| LoggerError::io_operation("creating compressed log", &temp_gz_path, e))?;
    let mut encoder = GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        Compression::default(),
    );

    let written = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| io::Write::flush(&mut writer));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation("compressing rotated log", path, e));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation("moving compressed log into place", &gz_path, e)
    })?;

    if let Err(e) = fs::remove_file(path) {
        report(format_args!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}. \
             Both compressed and uncompressed versions exist.",
            path.display(),
            e
        ));
    }

    Ok(gz_path)
}

fn is_taken(path: &Path) -> bool {
    path.exists() || append_to_path(path, ".gz").exists()
}

fn append_to_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
