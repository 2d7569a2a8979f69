//! Size-based rotation of the daemon log file.
//!
//! Applied once at daemon start, before the file layer opens `synch.log`.
//! Backups are numbered `synch.log.1` (newest) to `synch.log.<keep>`
//! (oldest); anything past `keep` is dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default size threshold (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of backups kept.
pub const MAX_ROTATED_FILES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub keep: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_LOG_BYTES,
            keep: MAX_ROTATED_FILES,
        }
    }
}

impl RotationPolicy {
    /// Rotate `log` when it has reached `max_bytes`.
    ///
    /// Returns `Ok(false)` when the file is smaller or missing. With
    /// `keep == 0` an oversized log is simply removed.
    pub fn apply(&self, log: &Path) -> io::Result<bool> {
        let size = match fs::metadata(log) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };
        if size < self.max_bytes {
            return Ok(false);
        }

        if self.keep == 0 {
            fs::remove_file(log)?;
            return Ok(true);
        }

        remove_if_present(&backup_path(log, self.keep))?;
        for n in (1..self.keep).rev() {
            let from = backup_path(log, n);
            if from.exists() {
                fs::rename(&from, backup_path(log, n + 1))?;
            }
        }
        fs::rename(log, backup_path(log, 1))?;
        Ok(true)
    }
}

fn backup_path(log: &Path, n: usize) -> PathBuf {
    let mut name = log.file_name().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(format!(".{n}"));
    log.with_file_name(name)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SMALL: RotationPolicy = RotationPolicy {
        max_bytes: 16,
        keep: 3,
    };

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn small_or_missing_logs_are_left_alone() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("synch.log");
        assert!(!SMALL.apply(&log).unwrap());

        fs::write(&log, "short").unwrap();
        assert!(!SMALL.apply(&log).unwrap());
        assert_eq!(read(&log), "short");
        assert!(!backup_path(&log, 1).exists());
    }

    #[test]
    fn oversized_log_moves_to_first_backup() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("synch.log");
        fs::write(&log, "0123456789abcdef-overflow").unwrap();

        assert!(SMALL.apply(&log).unwrap());
        assert!(!log.exists(), "the file layer recreates the live log");
        assert_eq!(read(&backup_path(&log, 1)), "0123456789abcdef-overflow");
    }

    #[test]
    fn backups_shift_and_the_oldest_is_dropped() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("synch.log");

        for round in 1..=5 {
            fs::write(&log, format!("round {round} ------------------")).unwrap();
            assert!(SMALL.apply(&log).unwrap());
        }

        assert!(read(&backup_path(&log, 1)).starts_with("round 5"));
        assert!(read(&backup_path(&log, 2)).starts_with("round 4"));
        assert!(read(&backup_path(&log, 3)).starts_with("round 3"));
        assert!(!backup_path(&log, 4).exists());
    }

    #[test]
    fn keep_zero_discards_the_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("synch.log");
        fs::write(&log, vec![b'x'; 64]).unwrap();

        let policy = RotationPolicy { max_bytes: 16, keep: 0 };
        assert!(policy.apply(&log).unwrap());
        assert!(!log.exists());
        assert!(!backup_path(&log, 1).exists());
    }

    #[test]
    fn default_policy_is_ten_mebibytes_five_backups() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
        assert_eq!(policy.keep, 5);
    }
}
