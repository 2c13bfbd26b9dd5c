//! Application orchestrator.
//! Merges config, initializes logging, installs the interrupt handler and
//! dispatches the subcommand.

use anyhow::{Context, Result};
use std::fs;
use std::process::ExitCode;
use tracing::{debug, error};

use clismoke::builder::verify_binary;
use clismoke::cli::{Args, Commands, Expectations};
use clismoke::config::apply_env_overrides;
use clismoke::logging::init_tracing;
use clismoke::output as out;
use clismoke::{
    CheckReport, CleanupOutcome, HarnessConfig, HarnessError, build_cli_binary, cleanup,
    find_project_root_from, project_root, run_and_check, shutdown,
};

/// Exit code when at least one check reported a failure.
const EXIT_CHECK_FAILED: u8 = 1;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Defaults < environment < flags
    let mut cfg = HarnessConfig::default();
    apply_env_overrides(&mut cfg);
    args.apply_overrides(&mut cfg);

    // Held until return so the file appender flushes.
    let _guard = init_tracing(&cfg.log_level, args.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    ctrlc::set_handler(|| {
        shutdown::request();
        out::print_warn("Received interrupt; stopping child process...");
    })
    .context("failed to install signal handler")?;

    debug!("Starting clismoke: {:?}", args);

    match &args.command {
        Commands::Root { start } => {
            let root = match start {
                Some(dir) => find_project_root_from(dir, &cfg.manifest_name, &cfg.reserved_dir),
                None => project_root(&cfg),
            }
            .map_err(log_fatal)?;
            out::print_user(&root.display().to_string());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Build { out: dest, .. } => {
            let built = build_cli_binary(&cfg).map_err(log_fatal)?;
            fs::copy(built.path(), dest).with_context(|| {
                format!("Failed to copy {} -> {}", built.path().display(), dest.display())
            })?;
            verify_binary(dest).map_err(log_fatal)?;
            out::print_success(&format!("Built {} -> {}", cfg.bin_name, dest.display()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            binary,
            expectations,
        } => {
            let report = run_and_check(
                binary,
                &expectations.args,
                &expectations.expect,
                cfg.run_timeout,
            )
            .map_err(log_fatal)?;
            emit_report(&report, expectations)
        }
        Commands::Smoke { expectations, .. } => {
            let built = build_cli_binary(&cfg).map_err(log_fatal)?;
            let result = run_and_check(
                built.path(),
                &expectations.args,
                &expectations.expect,
                cfg.run_timeout,
            );
            cleanup(built.path());
            let report = result.map_err(log_fatal)?;
            emit_report(&report, expectations)
        }
        Commands::Clean { path } => {
            match cleanup(path) {
                CleanupOutcome::Removed => {
                    out::print_success(&format!("Removed {}", path.display()))
                }
                CleanupOutcome::AlreadyGone => {
                    out::print_info(&format!("Nothing to remove at {}", path.display()))
                }
                CleanupOutcome::Failed => {
                    out::print_warn(&format!("Could not remove {}; see log", path.display()))
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print the report and map it to an exit code.
fn emit_report(report: &CheckReport, expectations: &Expectations) -> Result<ExitCode> {
    if expectations.report_json {
        let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
        out::print_user(&json);
    } else if report.passed() {
        out::print_success(&format!(
            "{} expectation(s) found in output of `{}`",
            expectations.expect.len(),
            report.command
        ));
    } else {
        for failure in &report.failures {
            out::print_fail(&failure.to_string());
        }
        out::print_info(&format!("Full output:\n{}", report.output));
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_CHECK_FAILED))
    }
}

/// Log a fatal harness error with structured fields, then hand it to anyhow.
fn log_fatal(e: HarnessError) -> anyhow::Error {
    let code = e.code();
    let kind = e.kind();
    match &e {
        HarnessError::ProjectRootNotFound { start, manifest } => {
            error!(code, kind, start = %start.display(), %manifest, "Could not find project root")
        }
        HarnessError::BuildFailed { command, status, .. } => {
            error!(code, kind, %command, %status, "Build failed")
        }
        HarnessError::BuildTimeout { command, timeout, .. } => {
            error!(code, kind, %command, timeout_secs = timeout.as_secs(), "Build timed out")
        }
        HarnessError::RunTimeout { command, timeout } => {
            error!(code, kind, %command, timeout_secs = timeout.as_secs(), "Run timed out")
        }
        HarnessError::BinaryMissing { path, .. } | HarnessError::NotExecutable(path) => {
            error!(code, kind, path = %path.display(), "Binary unusable after build")
        }
        _ => error!(code, kind, error = %e, "Harness error"),
    }
    e.into()
}
