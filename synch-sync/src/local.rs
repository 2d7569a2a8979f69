//! Local Lister: regular files directly inside the configured folder.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Timelike, Utc};

use synch_core::{FileKind, FileName, FileRecord, Snapshot};

use crate::error::{io_err, SyncError};

/// List the regular files in `dir`, sorted by name.
///
/// Subdirectories are skipped. Symlinks are followed, so a link to a file is
/// listed and a link to a directory is not. Entries that cannot be stat'ed
/// (vanished, looping or unreadable links) are skipped. Fails with
/// [`SyncError::LocalIo`] only if `dir` itself is missing or unreadable.
pub fn list_local(dir: &Path) -> Result<Snapshot, SyncError> {
    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();

        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "entry vanished or dangling link, skipping");
                continue;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot stat entry, skipping");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::warn!(path = %path.display(), "skipping file with a non UTF-8 name");
            continue;
        };

        let modified = meta.modified().map_err(|e| io_err(&path, e))?;
        records.push(FileRecord {
            name: FileName::from(name),
            modified_at: mtime_to_utc(modified),
            location: path.display().to_string(),
            size: Some(meta.len()),
            kind: FileKind::File,
        });
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Snapshot::from_records(records))
}

/// Filesystem mtime as UTC with a `+00:00` offset, truncated to whole
/// seconds to match the second-precision timestamps remote listings report.
pub fn mtime_to_utc(time: SystemTime) -> DateTime<FixedOffset> {
    let utc: DateTime<Utc> = time.into();
    let utc = utc.with_nanosecond(0).unwrap_or(utc);
    utc.fixed_offset()
}
