use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "synch.log";

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}
