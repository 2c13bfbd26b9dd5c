//! Windows (and other non-Unix) implementations of platform helpers.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Windows has no execute bit; a regular file with an `.exe` suffix counts.
pub fn is_executable(path: &Path) -> io::Result<bool> {
    let meta = fs::metadata(path)?;
    let has_exe = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("exe"))
        .unwrap_or(false);
    Ok(meta.is_file() && has_exe)
}

/// Open log file for appending. ACLs are inherited from the parent directory.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}
