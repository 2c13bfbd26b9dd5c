//! Build the CLI under test from local source.
//!
//! Runs the compiler in the project root with a bounded timeout, reads the
//! executable path from cargo's JSON artifact messages and copies it into a
//! temporary directory owned by the returned [`BuiltBinary`]. Whatever is on
//! disk gets built, uncommitted changes included.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::errors::HarnessError;
use crate::platform::{binary_file_name, is_executable};
use crate::process::{Aborted, display_command, supervise};
use crate::root::project_root;

/// A freshly compiled binary living in its own temporary directory.
/// Dropping it removes the directory and the binary with it.
#[derive(Debug)]
pub struct BuiltBinary {
    dir: TempDir,
    path: PathBuf,
    project_root: PathBuf,
}

impl BuiltBinary {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Temporary directory holding the binary.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    target: Option<CargoTarget>,
    #[serde(default)]
    executable: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CargoTarget {
    name: String,
    #[serde(default)]
    kind: Vec<String>,
}

/// Compiler arguments for building `cfg.bin_name`.
pub fn build_args(cfg: &HarnessConfig) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "--message-format=json-render-diagnostics".to_string(),
        "--bin".to_string(),
        cfg.bin_name.clone(),
    ];
    if cfg.release {
        args.push("--release".to_string());
    }
    if let Some(dir) = &cfg.target_dir {
        args.push("--target-dir".to_string());
        args.push(dir.display().to_string());
    }
    args
}

/// Executable path of bin target `bin` from cargo's `--message-format=json` stdout.
/// Lines that are not JSON artifact messages are ignored.
pub fn find_executable(stdout: &str, bin: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|m| m.reason == "compiler-artifact")
        .filter(|m| {
            m.target
                .as_ref()
                .map(|t| t.name == bin && t.kind.iter().any(|k| k == "bin"))
                .unwrap_or(false)
        })
        .filter_map(|m| m.executable)
        .last()
}

/// Build the configured bin target and return the temporary binary.
pub fn build_cli_binary(cfg: &HarnessConfig) -> Result<BuiltBinary, HarnessError> {
    let dir = tempfile::Builder::new()
        .prefix("clismoke-")
        .tempdir()
        .map_err(HarnessError::TempDir)?;
    let binary_path = dir.path().join(binary_file_name(&cfg.output_name));

    let root = match &cfg.project_root {
        Some(root) => root.clone(),
        None => project_root(cfg)?,
    };

    let args = build_args(cfg);
    let command = display_command(&cfg.compiler, &args);
    let mut cmd = Command::new(&cfg.compiler);
    cmd.args(&args).current_dir(&root);

    info!("Building CLI binary: {}", binary_path.display());
    info!("Project root: {}", root.display());
    debug!(%command, timeout_secs = cfg.build_timeout.as_secs(), "Invoking compiler");

    let out = supervise(&mut cmd, cfg.build_timeout).map_err(|aborted| match aborted {
        Aborted::Timeout { stderr } => HarnessError::BuildTimeout {
            command: command.clone(),
            timeout: cfg.build_timeout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        },
        Aborted::Interrupted => HarnessError::Interrupted {
            command: command.clone(),
        },
        Aborted::Spawn(source) => HarnessError::Spawn {
            command: command.clone(),
            source,
        },
        Aborted::Io(source) => HarnessError::Io {
            command: command.clone(),
            source,
        },
    })?;

    if !out.status.success() {
        return Err(HarnessError::BuildFailed {
            command,
            status: out.status.to_string(),
            stderr: out.stderr_lossy(),
        });
    }
    debug!(elapsed_ms = out.elapsed.as_millis() as u64, "Build finished");

    let built = find_executable(&out.stdout_lossy(), &cfg.bin_name).ok_or_else(|| {
        HarnessError::NoArtifact {
            bin: cfg.bin_name.clone(),
        }
    })?;
    fs::copy(&built, &binary_path).map_err(|source| HarnessError::CopyArtifact {
        from: built.clone(),
        to: binary_path.clone(),
        source,
    })?;

    verify_binary(&binary_path)?;

    Ok(BuiltBinary {
        dir,
        path: binary_path,
        project_root: root,
    })
}

/// The file must exist and be executable.
pub fn verify_binary(path: &Path) -> Result<(), HarnessError> {
    match is_executable(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(HarnessError::NotExecutable(path.to_path_buf())),
        Err(source) => Err(HarnessError::BinaryMissing {
            path: path.to_path_buf(),
            source,
        }),
    }
}
