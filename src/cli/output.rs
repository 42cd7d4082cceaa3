//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{IsTerminal, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Console title text: "<name> - <version>".
pub fn title(name: &str, version: &str) -> String {
    format!("{} - {}", name, version)
}

/// Set the terminal window title. No-op when stdout is not a terminal.
pub fn set_title(name: &str, version: &str) {
    let mut stdout = std::io::stdout();
    if !stdout.is_terminal() {
        return;
    }
    // OSC 0: icon name and window title
    let _ = write!(stdout, "\x1b]0;{}\x07", title(name, version));
    let _ = stdout.flush();
}
