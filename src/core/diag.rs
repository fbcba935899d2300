//! Stderr diagnostics
//!
//! Results go to stdout through the renderer; progress notes, per-file detail
//! and warnings go to stderr through here so piping stays clean.

use colored::Colorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    quiet: bool,
    verbose: bool,
}

impl Diagnostics {
    /// `no_color` is applied process-wide through `colored`'s override.
    pub fn new(quiet: bool, verbose: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { quiet, verbose }
    }

    pub fn note(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{} {}", "•".cyan(), message.as_ref());
        }
    }

    /// Only shown with --verbose
    pub fn detail(&self, message: impl AsRef<str>) {
        if self.verbose && !self.quiet {
            eprintln!("  {}", message.as_ref().dimmed());
        }
    }

    /// Warnings are shown even in quiet mode
    pub fn warn(&self, message: impl AsRef<str>) {
        eprintln!("{} {}", "⚠".yellow(), message.as_ref());
    }

    pub fn success(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{} {}", "✓".green(), message.as_ref());
        }
    }
}
