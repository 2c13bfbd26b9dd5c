//! Minimal CLI used as the subject binary in clismoke's end-to-end tests.

use std::process::ExitCode;

const USAGE: &str = "Usage: subject_cli [OPTIONS] [NAME]

Options:
  -h, --help     Print help
  -V, --version  Print version
      --shout    Greet in capitals";

fn main() -> ExitCode {
    let mut shout = false;
    let mut name = String::from("world");
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("Greets someone.\n\n{USAGE}");
                return ExitCode::SUCCESS;
            }
            "-V" | "--version" => {
                println!("subject_cli {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            "--shout" => shout = true,
            flag if flag.starts_with('-') => {
                eprintln!("error: unexpected argument '{flag}' found\n\n{USAGE}");
                return ExitCode::from(2);
            }
            other => name = other.to_string(),
        }
    }
    let greeting = format!("hello, {name}");
    if shout {
        println!("{}", greeting.to_uppercase());
    } else {
        println!("{greeting}");
    }
    ExitCode::SUCCESS
}
