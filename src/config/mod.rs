//! Config module.
//! Provides harness settings, their defaults, and environment overrides.

pub mod env;
pub mod types;

pub use env::apply_env_overrides;
pub use types::{HarnessConfig, LogLevel};

use std::time::Duration;

/// Upper bound on the compiler invocation.
pub const BUILD_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30);
/// Upper bound on a single run of the subject binary.
pub const RUN_TIMEOUT_DEFAULT: Duration = Duration::from_secs(10);
/// File whose presence marks a package root.
pub const MANIFEST_NAME_DEFAULT: &str = "Cargo.toml";
/// Directory name whose manifest never counts as the project root.
pub const RESERVED_DIR_DEFAULT: &str = "tests";
/// Compiler used when `$CARGO` is not set.
pub const COMPILER_DEFAULT: &str = "cargo";
