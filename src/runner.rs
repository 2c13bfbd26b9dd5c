//! Run the subject binary and check what it printed.
//!
//! A non-zero exit is not a failure by itself: help and usage-error paths of
//! many CLIs exit non-zero while printing useful text to stderr, so on a
//! non-zero exit stderr is appended to the checked output.

use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::errors::HarnessError;
use crate::process::{display_command, run_with_timeout};

/// A reported, non-fatal check failure. All checks run before any is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckFailure {
    #[error("expected output to contain {expected:?}, but it didn't")]
    MissingSubstring { expected: String },

    #[error("output was empty")]
    EmptyOutput,
}

/// Outcome of one [`run_and_check`] call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub command: String,
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    /// stdout, plus stderr when the exit was non-zero
    pub output: String,
    pub stderr: String,
    pub failures: Vec<CheckFailure>,
    pub elapsed_ms: u64,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Expectations that were not found, in the order given.
    pub fn missing(&self) -> Vec<&str> {
        self.failures
            .iter()
            .filter_map(|f| match f {
                CheckFailure::MissingSubstring { expected } => Some(expected.as_str()),
                CheckFailure::EmptyOutput => None,
            })
            .collect()
    }

    pub fn output_was_empty(&self) -> bool {
        self.failures.contains(&CheckFailure::EmptyOutput)
    }

    /// Panic listing every failure and the full output if any check failed.
    #[track_caller]
    pub fn assert_passed(&self) {
        if self.passed() {
            return;
        }
        let mut msg = format!("{} check(s) failed for `{}`:\n", self.failures.len(), self.command);
        for failure in &self.failures {
            let _ = writeln!(msg, "  - {failure}");
        }
        let _ = write!(msg, "Full output:\n{}", self.output);
        panic!("{msg}");
    }
}

/// Text the expectations are checked against.
pub fn combine_output(stdout: &str, stderr: &str, success: bool) -> String {
    let mut output = stdout.to_string();
    if !success && !stderr.is_empty() {
        output.push_str(stderr);
    }
    output
}

/// Check every expectation independently, then the empty-output rule.
pub fn evaluate<E: AsRef<str>>(output: &str, expected: &[E]) -> Vec<CheckFailure> {
    let mut failures: Vec<CheckFailure> = expected
        .iter()
        .map(|e| e.as_ref())
        .filter(|e| !output.contains(*e))
        .map(|e| CheckFailure::MissingSubstring {
            expected: e.to_string(),
        })
        .collect();
    if output.trim().is_empty() {
        failures.push(CheckFailure::EmptyOutput);
    }
    failures
}

/// Run `binary` with `args` under `timeout` and check its output for every
/// string in `expected`.
///
/// Spawn failures and timeouts are fatal (`Err`); missing text and empty output
/// are recorded in the returned report.
pub fn run_and_check<A, E>(
    binary: &Path,
    args: &[A],
    expected: &[E],
    timeout: Duration,
) -> Result<CheckReport, HarnessError>
where
    A: AsRef<OsStr>,
    E: AsRef<str>,
{
    let command = display_command(binary.as_os_str(), args);
    let mut cmd = Command::new(binary);
    cmd.args(args);
    let out = run_with_timeout(&mut cmd, timeout)?;

    let stdout = out.stdout_lossy();
    let stderr = out.stderr_lossy();
    let success = out.status.success();
    if !success {
        info!(
            "Command failed (this might be expected for some help commands): {}",
            out.status
        );
        info!("Stderr: {stderr}");
    }
    let output = combine_output(&stdout, &stderr, success);

    info!("Command: {command}");
    info!("Output:\n{output}");

    let failures = evaluate(&output, expected);
    for failure in &failures {
        info!(%failure, "Check failed");
    }

    Ok(CheckReport {
        command,
        exit_code: out.status.code(),
        success,
        output,
        stderr,
        failures,
        elapsed_ms: out.elapsed.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_present_reports_nothing() {
        let failures = evaluate("Usage: tool [OPTIONS]\n  --help", &["Usage", "--help"]);
        assert!(failures.is_empty());
    }

    #[test]
    fn only_the_absent_expectation_is_reported() {
        let failures = evaluate("Usage: tool", &["Usage", "--verbose", "tool"]);
        assert_eq!(
            failures,
            vec![CheckFailure::MissingSubstring {
                expected: "--verbose".into()
            }]
        );
    }

    #[test]
    fn whitespace_only_output_is_empty() {
        let failures = evaluate::<&str>(" \n\t", &[]);
        assert_eq!(failures, vec![CheckFailure::EmptyOutput]);
    }

    #[test]
    fn empty_output_is_reported_alongside_missing_text() {
        let failures = evaluate("", &["Usage"]);
        assert_eq!(failures.len(), 2);
        assert!(failures.contains(&CheckFailure::EmptyOutput));
    }

    #[test]
    fn stderr_only_merged_on_failure() {
        assert_eq!(combine_output("out\n", "err\n", true), "out\n");
        assert_eq!(combine_output("out\n", "err\n", false), "out\nerr\n");
        assert_eq!(combine_output("", "", false), "");
    }

    #[test]
    fn report_lists_missing_in_order() {
        let report = CheckReport {
            command: "tool".into(),
            exit_code: Some(0),
            success: true,
            output: String::new(),
            stderr: String::new(),
            failures: evaluate("", &["a", "b"]),
            elapsed_ms: 0,
        };
        assert_eq!(report.missing(), vec!["a", "b"]);
        assert!(report.output_was_empty());
        assert!(!report.passed());
    }

    #[test]
    #[should_panic(expected = "expected output to contain \"Usage\"")]
    fn assert_passed_panics_with_details() {
        let report = CheckReport {
            command: "tool --help".into(),
            exit_code: Some(0),
            success: true,
            output: "nothing useful".into(),
            stderr: String::new(),
            failures: evaluate("nothing useful", &["Usage"]),
            elapsed_ms: 0,
        };
        report.assert_passed();
    }

    #[test]
    fn failure_serializes_with_kind_tag() {
        let json = serde_json::to_string(&CheckFailure::MissingSubstring {
            expected: "Usage".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"missing_substring","expected":"Usage"}"#);
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::fs;
        use std::path::PathBuf;

        // Run through `sh` rather than exec'ing the freshly written file, which
        // can fail with ETXTBSY while other test threads are forking.
        fn script(dir: &Path, body: &str) -> PathBuf {
            let p = dir.join("fake-cli.sh");
            fs::write(&p, format!("{body}\n")).unwrap();
            p
        }

        fn sh() -> &'static Path {
            Path::new("sh")
        }

        #[test]
        fn nonzero_exit_checks_stderr_text() {
            let td = tempfile::tempdir().unwrap();
            let s = script(
                td.path(),
                "echo 'error: unknown flag' >&2\necho 'Usage: fake-cli' >&2\nexit 2",
            );
            let args = [s.as_os_str(), OsStr::new("--nope")];
            let expected = ["Usage", "unknown flag"];
            let report = run_and_check(sh(), &args, &expected, Duration::from_secs(5)).unwrap();
            assert!(!report.success);
            assert_eq!(report.exit_code, Some(2));
            assert!(report.passed(), "{:?}", report.failures);
        }

        #[test]
        fn zero_exit_ignores_stderr() {
            let td = tempfile::tempdir().unwrap();
            let s = script(td.path(), "echo 'Usage: fake-cli' >&2\nexit 0");
            let report =
                run_and_check(sh(), &[s.as_os_str()], &["Usage"], Duration::from_secs(5)).unwrap();
            assert!(report.success);
            assert_eq!(report.missing(), vec!["Usage"]);
            assert!(report.output_was_empty());
        }

        #[test]
        fn silent_failure_reports_empty_output() {
            let td = tempfile::tempdir().unwrap();
            let s = script(td.path(), "exit 1");
            let report =
                run_and_check::<_, &str>(sh(), &[s.as_os_str()], &[], Duration::from_secs(5))
                    .unwrap();
            assert_eq!(report.failures, vec![CheckFailure::EmptyOutput]);
        }

        #[test]
        fn hanging_binary_times_out() {
            let td = tempfile::tempdir().unwrap();
            let s = script(td.path(), "exec sleep 30");
            let err = run_and_check(sh(), &[s.as_os_str()], &["Usage"], Duration::from_millis(200))
                .unwrap_err();
            assert!(matches!(err, HarnessError::RunTimeout { .. }));
        }
    }
}
