//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Global flags override `CLISMOKE_*` environment values, which override defaults.
//! - --debug is a shorthand for --log-level debug.
//! - Arguments for the subject binary follow `--`.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{HarnessConfig, LogLevel};

/// Build a CLI from local source and smoke-test its output.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Build a CLI from local source and smoke-test its output"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Also append logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Upper bound on the compiler invocation, in seconds.
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub build_timeout: Option<u64>,

    /// Upper bound on each run of the subject binary, in seconds.
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub run_timeout: Option<u64>,

    /// Cargo target directory for the build.
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub target_dir: Option<PathBuf>,

    /// Build with the release profile.
    #[arg(long, global = true)]
    pub release: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the project root found by walking up from the working directory.
    Root {
        /// Start the search here instead of the working directory.
        #[arg(long, value_hint = ValueHint::DirPath)]
        start: Option<PathBuf>,
    },

    /// Build the binary and copy it to --out.
    Build {
        #[command(flatten)]
        target: BuildTarget,

        /// Where to put the built binary.
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },

    /// Run an existing binary and check its output.
    Check {
        /// Binary to run.
        #[arg(long, value_hint = ValueHint::ExecutablePath)]
        binary: PathBuf,

        #[command(flatten)]
        expectations: Expectations,
    },

    /// Build the binary, check its output, then remove it.
    Smoke {
        #[command(flatten)]
        target: BuildTarget,

        #[command(flatten)]
        expectations: Expectations,
    },

    /// Remove a binary; a missing file is not an error.
    Clean {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildTarget {
    /// Project root to build in (skips the upward search).
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub project: Option<PathBuf>,

    /// Cargo bin target to build.
    #[arg(long)]
    pub bin: Option<String>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Expectations {
    /// Text the output must contain (repeatable).
    #[arg(short = 'e', long = "expect", value_name = "TEXT")]
    pub expect: Vec<String>,

    /// Print the check report as JSON on stdout.
    #[arg(long)]
    pub report_json: bool,

    /// Arguments passed to the binary.
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut HarnessConfig) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(secs) = self.build_timeout {
            cfg.build_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.run_timeout {
            cfg.run_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &self.target_dir {
            cfg.target_dir = Some(dir.clone());
        }
        if self.release {
            cfg.release = true;
        }
        if let Commands::Build { target, .. } | Commands::Smoke { target, .. } = &self.command {
            if let Some(root) = &target.project {
                cfg.project_root = Some(root.clone());
            }
            if let Some(bin) = &target.bin {
                cfg.bin_name = bin.clone();
                cfg.output_name = format!("{bin}-test");
            }
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
