//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes when stdout is
//! not a terminal.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic colors for CLI output
pub trait Stylize {
    /// Secondary information
    fn muted(&self) -> String;
    /// Something went well
    fn success(&self) -> String;
    /// Something needs attention
    fn warn(&self) -> String;
    /// Identifiers such as URLs
    fn accent(&self) -> String;
    /// Headings
    fn emphasis(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }
}

/// Check mark used for merged pull requests
pub const fn check() -> &'static str {
    "✓"
}
