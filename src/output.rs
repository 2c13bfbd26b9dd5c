//! Prefixed, optionally coloured lines for the CLI.
//!
//! Reports (`ok:`, `FAIL:`, plain results) go to stdout so they can be piped;
//! diagnostics (`warn:`, `error:`) go to stderr. Colour is used only when the
//! target stream is a terminal.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Info,
    Warn,
    Error,
    Ok,
    Fail,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Tag::Info => "info:",
            Tag::Warn => "warn:",
            Tag::Error => "error:",
            Tag::Ok => "ok:",
            Tag::Fail => "FAIL:",
        }
    }

    fn stream(self) -> atty::Stream {
        match self {
            Tag::Warn | Tag::Error => atty::Stream::Stderr,
            Tag::Info | Tag::Ok | Tag::Fail => atty::Stream::Stdout,
        }
    }

    fn render(self, msg: &str, color: bool) -> String {
        if !color {
            return format!("{} {}", self.label(), msg);
        }
        let label = self.label();
        let painted = match self {
            Tag::Info => label.cyan().bold().to_string(),
            Tag::Warn => label.yellow().bold().to_string(),
            Tag::Ok => label.green().bold().to_string(),
            Tag::Error | Tag::Fail => label.red().bold().to_string(),
        };
        format!("{painted} {msg}")
    }
}

fn emit(tag: Tag, msg: &str) {
    let line = tag.render(msg, atty::is(tag.stream()));
    match tag.stream() {
        atty::Stream::Stderr => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Tag::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tag::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tag::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Tag::Ok, msg);
}

/// One unmet expectation of a check report.
pub fn print_fail(msg: &str) {
    emit(Tag::Fail, msg);
}

/// Unprefixed stdout line for values users script against, such as the
/// project root path or a JSON report.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_go_to_stdout_and_diagnostics_to_stderr() {
        for tag in [Tag::Info, Tag::Ok, Tag::Fail] {
            assert!(matches!(tag.stream(), atty::Stream::Stdout), "{tag:?}");
        }
        for tag in [Tag::Warn, Tag::Error] {
            assert!(matches!(tag.stream(), atty::Stream::Stderr), "{tag:?}");
        }
    }

    #[test]
    fn plain_render_has_no_escape_codes() {
        assert_eq!(Tag::Fail.render("missing \"Usage\"", false), "FAIL: missing \"Usage\"");
        assert_eq!(Tag::Ok.render("3 checks", false), "ok: 3 checks");
    }

    #[test]
    fn coloured_render_keeps_label_and_message() {
        let line = Tag::Error.render("boom", true);
        assert!(line.contains("error:"));
        assert!(line.ends_with(" boom"));
        assert!(line.contains('\u{1b}'));
    }
}
