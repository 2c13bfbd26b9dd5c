//! Core library for `clismoke`.
//!
//! Builds a CLI from local source into a temporary binary, runs it with argument
//! lists, and checks that expected text shows up in what it prints.
//!
//! The four operations are plain functions ([`build_cli_binary`], [`project_root`],
//! [`run_and_check`], [`cleanup`]); [`Harness`] bundles them for a single test.
//!
//! ```no_run
//! use clismoke::{Harness, HarnessConfig};
//!
//! let harness = Harness::build(&HarnessConfig::for_bin("mytool")).unwrap();
//! harness.check(&["--help"], &["Usage"]).unwrap().assert_passed();
//! ```

pub mod builder;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod harness;
pub mod logging;
pub mod output;
pub mod platform;
pub mod process;
pub mod root;
pub mod runner;
pub mod shutdown;

pub use builder::{BuiltBinary, build_cli_binary};
pub use cleanup::{CleanupOutcome, cleanup};
pub use config::{HarnessConfig, LogLevel};
pub use errors::HarnessError;
pub use harness::Harness;
pub use process::{CapturedOutput, run_with_timeout};
pub use root::{find_project_root_from, project_root};
pub use runner::{CheckFailure, CheckReport, run_and_check};
