//! Shell output and progress for the fwkit CLI.
//!
//! Commands print through a [`Shell`] so that human and JSON output stay
//! apart: in JSON mode nothing but one JSON object per line reaches stdout,
//! and human status lines go to stderr.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Shell output mode. Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON lines only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Status lines and progress bars
    #[default]
    Normal,
    /// Every event as its own line, no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Status of a human output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // green
    Resolved,
    Updated,
    Finished,

    // cyan
    Searching,
    Fetching,
    Installing,

    Info,

    // yellow
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Resolved => "Resolved",
            Status::Updated => "Updated",
            Status::Finished => "Finished",
            Status::Searching => "Searching",
            Status::Fetching => "Fetching",
            Status::Installing => "Installing",
            Status::Info => "Info",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Resolved | Status::Updated | Status::Finished => "\x1b[1;32m",
            Status::Searching | Status::Fetching | Status::Installing => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
        }
    }
}

/// Width the status word is right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags. JSON takes precedence over verbose.
    pub fn from_flags(verbose: bool, no_color: bool, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            ShellMode::Human {
                verbosity: if verbose {
                    Verbosity::Verbose
                } else {
                    Verbosity::Normal
                },
                color: if no_color {
                    ColorChoice::Never
                } else {
                    ColorChoice::Auto
                },
            }
        };

        Shell::new(mode)
    }

    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Print `{status:>12} {message}` to stderr. Ignored in JSON mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print one serialized value as a JSON line on stdout.
    ///
    /// Only works in JSON mode; silently ignored in human mode.
    pub fn json_line<T: serde::Serialize + ?Sized>(&self, value: &T) {
        if !self.is_json() {
            return;
        }
        let line = serde_json::to_string(value).unwrap_or_default();
        println!("{}", line);
        let _ = io::stdout().flush();
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Create a progress bar over `total` items.
    ///
    /// Verbose and JSON shells get a no-op bar, as does a total of one or
    /// fewer items.
    pub fn progress(&self, total: u64, msg: impl Display) -> Progress {
        let pb = if self.is_verbose() || self.is_json() || total <= 1 {
            None
        } else {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(msg.to_string());
            Some(pb)
        };

        Progress { pb }
    }
}

/// Progress bar that respects the shell mode.
pub struct Progress {
    pb: Option<ProgressBar>,
}

impl Progress {
    pub fn inc(&self, delta: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        let shell = Shell::from_flags(false, true, false);
        assert!(!shell.is_verbose());
        assert!(!shell.is_json());
        assert!(!shell.use_color);

        let shell = Shell::from_flags(true, true, false);
        assert!(shell.is_verbose());

        // JSON takes precedence
        let shell = Shell::from_flags(true, false, true);
        assert!(shell.is_json());
        assert!(!shell.is_verbose());
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Never,
        });

        let formatted = shell.format_status(Status::Updated);
        assert_eq!(formatted.trim(), "Updated");
        assert_eq!(formatted.len(), STATUS_WIDTH);
    }

    #[test]
    fn test_progress_is_noop_when_verbose() {
        let shell = Shell::from_flags(true, true, false);
        let progress = shell.progress(10, "core");
        assert!(progress.pb.is_none());
        progress.inc(1);
        progress.finish();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
