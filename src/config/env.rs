//! Environment overrides.
//! Values from `CLISMOKE_*` variables are applied on top of defaults; CLI flags
//! are applied after this (see `cli::Args::apply_overrides`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use super::types::{HarnessConfig, LogLevel};

pub const ENV_BIN: &str = "CLISMOKE_BIN";
pub const ENV_PROJECT_ROOT: &str = "CLISMOKE_PROJECT_ROOT";
pub const ENV_TARGET_DIR: &str = "CLISMOKE_TARGET_DIR";
pub const ENV_BUILD_TIMEOUT: &str = "CLISMOKE_BUILD_TIMEOUT";
pub const ENV_RUN_TIMEOUT: &str = "CLISMOKE_RUN_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "CLISMOKE_LOG_LEVEL";

/// Apply `CLISMOKE_*` environment variables to `cfg` in place.
/// Unparseable values are ignored with a warning.
pub fn apply_env_overrides(cfg: &mut HarnessConfig) {
    if let Some(bin) = non_empty(ENV_BIN) {
        cfg.output_name = format!("{bin}-test");
        cfg.bin_name = bin;
    }
    if let Some(root) = non_empty(ENV_PROJECT_ROOT) {
        cfg.project_root = Some(PathBuf::from(root));
    }
    if let Some(dir) = non_empty(ENV_TARGET_DIR) {
        cfg.target_dir = Some(PathBuf::from(dir));
    }
    if let Some(t) = seconds(ENV_BUILD_TIMEOUT) {
        cfg.build_timeout = t;
    }
    if let Some(t) = seconds(ENV_RUN_TIMEOUT) {
        cfg.run_timeout = t;
    }
    if let Some(raw) = non_empty(ENV_LOG_LEVEL) {
        match LogLevel::parse(&raw) {
            Some(lvl) => cfg.log_level = lvl,
            None => warn!(var = ENV_LOG_LEVEL, value = %raw, "Ignoring invalid log level"),
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn seconds(var: &str) -> Option<Duration> {
    let raw = non_empty(var)?;
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!(
                var,
                value = %raw,
                "Ignoring invalid timeout; expected a positive number of seconds"
            );
            None
        }
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
