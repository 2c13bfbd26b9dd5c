//! Project root discovery.
//!
//! Walks from a start directory towards the filesystem root and returns the first
//! directory holding the manifest, skipping a directory named after the reserved
//! test-module name (its manifest belongs to the inner test package, not the
//! project under test).

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::HarnessConfig;
use crate::errors::HarnessError;

/// Locate the project root starting from the current working directory.
pub fn project_root(cfg: &HarnessConfig) -> Result<PathBuf, HarnessError> {
    let cwd = std::env::current_dir().map_err(HarnessError::CurrentDir)?;
    find_project_root_from(&cwd, &cfg.manifest_name, &cfg.reserved_dir)
}

/// Locate the project root starting from `start`.
///
/// Terminates when the current directory has no parent.
pub fn find_project_root_from(
    start: &Path,
    manifest: &str,
    reserved_dir: &str,
) -> Result<PathBuf, HarnessError> {
    let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let mut dir: &Path = &start;
    loop {
        let candidate = dir.join(manifest);
        if candidate.is_file() {
            if is_reserved(dir, reserved_dir) {
                debug!(dir = %dir.display(), "Skipping manifest in reserved directory");
            } else {
                return Ok(dir.to_path_buf());
            }
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent,
            _ => break,
        }
    }
    Err(HarnessError::ProjectRootNotFound {
        start,
        manifest: manifest.to_string(),
    })
}

fn is_reserved(dir: &Path, reserved_dir: &str) -> bool {
    dir.file_name().map(|n| n == reserved_dir).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn finds_manifest_in_start_dir() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Cargo.toml").touch().unwrap();
        let root = find_project_root_from(td.path(), "Cargo.toml", "tests").unwrap();
        assert_eq!(root, dunce::canonicalize(td.path()).unwrap());
    }

    #[test]
    fn skips_reserved_dir_manifest() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Cargo.toml").touch().unwrap();
        td.child("tests/Cargo.toml").touch().unwrap();
        let root =
            find_project_root_from(&td.path().join("tests"), "Cargo.toml", "tests").unwrap();
        assert_eq!(root, dunce::canonicalize(td.path()).unwrap());
    }

    #[test]
    fn nested_non_reserved_manifest_wins() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Cargo.toml").touch().unwrap();
        td.child("crates/inner/Cargo.toml").touch().unwrap();
        let start = td.path().join("crates/inner");
        let root = find_project_root_from(&start, "Cargo.toml", "tests").unwrap();
        assert_eq!(root, dunce::canonicalize(&start).unwrap());
    }

    #[test]
    fn manifest_named_directory_is_ignored() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Cargo.toml").touch().unwrap();
        td.child("sub/Cargo.toml").create_dir_all().unwrap();
        let root = find_project_root_from(&td.path().join("sub"), "Cargo.toml", "tests").unwrap();
        assert_eq!(root, dunce::canonicalize(td.path()).unwrap());
    }

    #[test]
    fn missing_manifest_fails_instead_of_looping() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("a/b/c").create_dir_all().unwrap();
        let err = find_project_root_from(
            &td.path().join("a/b/c"),
            "clismoke-marker-that-does-not-exist.toml",
            "tests",
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::ProjectRootNotFound { .. }));
    }
}
