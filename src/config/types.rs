//! Core configuration types.
//! - HarnessConfig holds build/run settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{
    BUILD_TIMEOUT_DEFAULT, COMPILER_DEFAULT, MANIFEST_NAME_DEFAULT, RESERVED_DIR_DEFAULT,
    RUN_TIMEOUT_DEFAULT,
};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Settings shared by the builder, runner and root locator.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Cargo bin target to build
    pub bin_name: String,
    /// File name (without platform suffix) of the temporary binary
    pub output_name: String,
    /// Marker file identifying a package root
    pub manifest_name: String,
    /// Directory name whose manifest is skipped by the root search
    pub reserved_dir: String,
    /// Compiler program
    pub compiler: OsString,
    /// Build here instead of searching upward from the working directory
    pub project_root: Option<PathBuf>,
    /// Passed to the compiler as `--target-dir`
    pub target_dir: Option<PathBuf>,
    /// Build with `--release`
    pub release: bool,
    pub build_timeout: Duration,
    pub run_timeout: Duration,
    /// Console verbosity of the CLI
    pub log_level: LogLevel,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::for_bin(env!("CARGO_PKG_NAME"))
    }
}

impl HarnessConfig {
    /// Config for building the bin target `bin`; other fields use defaults.
    pub fn for_bin(bin: impl Into<String>) -> Self {
        let bin_name = bin.into();
        Self {
            output_name: format!("{bin_name}-test"),
            bin_name,
            manifest_name: MANIFEST_NAME_DEFAULT.to_string(),
            reserved_dir: RESERVED_DIR_DEFAULT.to_string(),
            compiler: std::env::var_os("CARGO").unwrap_or_else(|| OsString::from(COMPILER_DEFAULT)),
            project_root: None,
            target_dir: None,
            release: false,
            build_timeout: BUILD_TIMEOUT_DEFAULT,
            run_timeout: RUN_TIMEOUT_DEFAULT,
            log_level: LogLevel::Normal,
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_bin_derives_output_name() {
        let cfg = HarnessConfig::for_bin("mytool");
        assert_eq!(cfg.bin_name, "mytool");
        assert_eq!(cfg.output_name, "mytool-test");
        assert_eq!(cfg.manifest_name, "Cargo.toml");
        assert_eq!(cfg.reserved_dir, "tests");
        assert_eq!(cfg.build_timeout, Duration::from_secs(30));
        assert_eq!(cfg.run_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_methods_override_fields() {
        let cfg = HarnessConfig::for_bin("x")
            .with_project_root("/proj")
            .with_target_dir("/tmp/t")
            .with_run_timeout(Duration::from_secs(1));
        assert_eq!(cfg.project_root, Some(PathBuf::from("/proj")));
        assert_eq!(cfg.target_dir, Some(PathBuf::from("/tmp/t")));
        assert_eq!(cfg.run_timeout, Duration::from_secs(1));
    }
}
