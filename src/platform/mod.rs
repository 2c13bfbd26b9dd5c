//! Platform-specific helpers.
//! Hides OS differences (Unix/Windows) behind a uniform API so the builder and
//! runner stay platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{is_executable, open_log_file_secure_append};

#[cfg(not(unix))]
pub use windows::{is_executable, open_log_file_secure_append};

/// File name for an executable called `stem` on the host OS
/// (`tool` on Unix, `tool.exe` on Windows).
pub fn binary_file_name(stem: &str) -> String {
    format!("{stem}{}", std::env::consts::EXE_SUFFIX)
}
