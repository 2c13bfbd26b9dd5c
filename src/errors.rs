//! Typed error definitions for clismoke.
//! Every variant is fatal for the current test; reported check failures live in
//! [`crate::runner::CheckFailure`] instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to get working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Could not find project root ({manifest} not found above {start})")]
    ProjectRootNotFound { start: PathBuf, manifest: String },

    #[error("Failed to create temporary directory for the binary: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build CLI binary: `{command}` exited with {status}\nStderr: {stderr}")]
    BuildFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Build of `{command}` timed out after {}s\nStderr: {stderr}", .timeout.as_secs())]
    BuildTimeout {
        command: String,
        timeout: Duration,
        stderr: String,
    },

    #[error("Build succeeded but reported no executable for bin target `{bin}`")]
    NoArtifact { bin: String },

    #[error("Failed to copy built binary {from} -> {to}: {source}")]
    CopyArtifact {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Binary not found after build: {path}: {source}")]
    BinaryMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Binary is not executable: {0}")]
    NotExecutable(PathBuf),

    #[error("Command `{command}` timed out after {}s", .timeout.as_secs())]
    RunTimeout { command: String, timeout: Duration },

    #[error("Command `{command}` interrupted by user")]
    Interrupted { command: String },

    #[error("I/O error while supervising `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            HarnessError::CurrentDir(_) => 10,
            HarnessError::ProjectRootNotFound { .. } => 11,
            HarnessError::TempDir(_) => 20,
            HarnessError::Spawn { .. } => 21,
            HarnessError::BuildFailed { .. } => 22,
            HarnessError::BuildTimeout { .. } => 23,
            HarnessError::NoArtifact { .. } => 24,
            HarnessError::CopyArtifact { .. } => 25,
            HarnessError::BinaryMissing { .. } => 26,
            HarnessError::NotExecutable(_) => 27,
            HarnessError::RunTimeout { .. } => 30,
            HarnessError::Interrupted { .. } => 31,
            HarnessError::Io { .. } => 32,
        }
    }

    /// Short machine-friendly kind used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::CurrentDir(_) => "current_dir",
            HarnessError::ProjectRootNotFound { .. } => "project_root_not_found",
            HarnessError::TempDir(_) => "temp_dir",
            HarnessError::Spawn { .. } => "spawn",
            HarnessError::BuildFailed { .. } => "build_failed",
            HarnessError::BuildTimeout { .. } => "build_timeout",
            HarnessError::NoArtifact { .. } => "no_artifact",
            HarnessError::CopyArtifact { .. } => "copy_artifact",
            HarnessError::BinaryMissing { .. } => "binary_missing",
            HarnessError::NotExecutable(_) => "not_executable",
            HarnessError::RunTimeout { .. } => "run_timeout",
            HarnessError::Interrupted { .. } => "interrupted",
            HarnessError::Io { .. } => "io",
        }
    }
}
