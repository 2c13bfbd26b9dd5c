//! Per-test harness object tying the builder, runner and cleanup together.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use crate::builder::{BuiltBinary, build_cli_binary};
use crate::cleanup::{CleanupOutcome, cleanup};
use crate::config::HarnessConfig;
use crate::errors::HarnessError;
use crate::runner::{CheckReport, run_and_check};

/// One freshly built binary plus the run timeout to use with it.
///
/// Dropping the harness removes the temporary directory holding the binary.
#[derive(Debug)]
pub struct Harness {
    built: BuiltBinary,
    run_timeout: Duration,
}

impl Harness {
    /// Build the bin target described by `cfg`.
    pub fn build(cfg: &HarnessConfig) -> Result<Self, HarnessError> {
        Ok(Self {
            built: build_cli_binary(cfg)?,
            run_timeout: cfg.run_timeout,
        })
    }

    pub fn binary(&self) -> &Path {
        self.built.path()
    }

    pub fn project_root(&self) -> &Path {
        self.built.project_root()
    }

    /// Run the binary with `args` and check its output for every `expected` string.
    pub fn check<A, E>(&self, args: &[A], expected: &[E]) -> Result<CheckReport, HarnessError>
    where
        A: AsRef<OsStr>,
        E: AsRef<str>,
    {
        run_and_check(self.binary(), args, expected, self.run_timeout)
    }

    /// Remove the binary now. Safe to call more than once.
    pub fn cleanup(&self) -> CleanupOutcome {
        cleanup(self.binary())
    }
}
