use std::process::ExitCode;

use clismoke::output as out;

mod app;

/// Exit code for fatal harness errors (build failure, timeout, missing root).
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let args = clismoke::cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(EXIT_FATAL)
        }
    }
}
