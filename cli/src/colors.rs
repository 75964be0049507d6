//! Semantic color helpers for consistent CLI output.

use colored::{ColoredString, Colorize};

/// Semantic color helpers for consistent CLI output.
///
/// | Element | Color | Usage |
/// |---------|-------|-------|
/// | Success | Green | Accepted payments, written files |
/// | Error | Red | Error messages, rejected payments |
/// | Warning | Yellow | Non-2xx replies that are not errors |
/// | Info | Cyan | Hints |
/// | Command | Cyan+Bold | Commands to run |
/// | Path | Blue | File paths |
/// | Url | Blue+Underline | Checkout links |
/// | Key | Bold | Labels, config keys |
/// | Dim | Dimmed | Secondary info |
pub struct Colors;

impl Colors {
    /// Green - for success messages and positive outcomes
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Red - for error messages and failures
    pub fn error(s: &str) -> ColoredString {
        s.red()
    }

    /// Yellow - for warnings and cautions
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Cyan - for informational messages and hints
    pub fn info(s: &str) -> ColoredString {
        s.cyan()
    }

    /// Cyan+Bold - for commands the user should run
    pub fn command(s: &str) -> ColoredString {
        s.cyan().bold()
    }

    /// Blue - for file and directory paths
    pub fn path(s: &str) -> ColoredString {
        s.blue()
    }

    pub fn url(s: &str) -> ColoredString {
        s.blue().underline()
    }

    /// Bold - for labels and config keys
    pub fn key(s: &str) -> ColoredString {
        s.bold()
    }

    /// Dimmed - for less important/secondary information
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}
