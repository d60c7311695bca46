//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Command
//! results reach the terminal through [`LogPane`], a bus observer; the
//! library itself never writes to stdout.

use std::fmt::Display;

use crate::engine::{Event, Notifier};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - only failures
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Where a rendered line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// The terminal log pane.
///
/// Successful results go to stdout, failed ones (nonzero status) to
/// stderr. Quiet mode keeps only the failures. Amend transitions are shown
/// in debug mode.
#[derive(Debug, Clone, Copy)]
pub struct LogPane {
    verbosity: Verbosity,
}

impl LogPane {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Decide what, if anything, to print for `event`.
    pub fn render(&self, event: &Event) -> Option<(Stream, String)> {
        match event {
            Event::LogCmd { status, text } if *status != 0 => {
                Some((Stream::Stderr, format!("[{}] {}", status, text.trim_end())))
            }
            Event::LogCmd { text, .. } => {
                if self.verbosity == Verbosity::Quiet || text.trim().is_empty() {
                    None
                } else {
                    Some((Stream::Stdout, text.trim_end().to_string()))
                }
            }
            Event::Amend { entering } => {
                if self.verbosity != Verbosity::Debug {
                    return None;
                }
                let state = if *entering { "on" } else { "off" };
                Some((Stream::Stderr, format!("[debug] amend mode {}", state)))
            }
        }
    }

    /// Attach the pane to `bus`.
    pub fn subscribe(self, bus: &Notifier) {
        bus.subscribe(move |event| match self.render(event) {
            Some((Stream::Stdout, line)) => println!("{}", line),
            Some((Stream::Stderr, line)) => eprintln!("{}", line),
            None => {}
        });
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(status: i32, text: &str) -> Event {
        Event::LogCmd {
            status,
            text: text.to_string(),
        }
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn success_goes_to_stdout() {
        let pane = LogPane::new(Verbosity::Normal);
        assert_eq!(
            pane.render(&log(0, "Staging: a.txt\n")),
            Some((Stream::Stdout, "Staging: a.txt".to_string()))
        );
    }

    #[test]
    fn failure_goes_to_stderr_even_when_quiet() {
        let pane = LogPane::new(Verbosity::Quiet);
        assert_eq!(
            pane.render(&log(1, "Commit failed: nothing to commit")),
            Some((Stream::Stderr, "[1] Commit failed: nothing to commit".to_string()))
        );
        assert_eq!(pane.render(&log(0, "ok")), None);
    }

    #[test]
    fn blank_text_is_skipped() {
        assert_eq!(LogPane::new(Verbosity::Normal).render(&log(0, "  \n")), None);
    }

    #[test]
    fn amend_events_only_in_debug() {
        let event = Event::Amend { entering: true };
        assert_eq!(LogPane::new(Verbosity::Normal).render(&event), None);
        assert_eq!(
            LogPane::new(Verbosity::Debug).render(&event),
            Some((Stream::Stderr, "[debug] amend mode on".to_string()))
        );
    }

    #[test]
    fn format_list_prefixes_each_line() {
        assert_eq!(format_list(&["a", "b"], "  - "), "  - a\n  - b");
    }
}
