//! Terminal output for the `bulkhash` binary.
//!
//! Results (digests, manifest paths) go to stdout so they can be piped.
//! Everything else goes to stderr:
//! - Dimmed colors for routine messages
//! - Bold colors for warnings and errors
//! - Verbosity control (quiet, normal, verbose)

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only warnings, errors and results.
    Quiet = 0,
    /// Default verbosity level.
    Normal = 1,
    /// Also show every diagnostic and per-step detail.
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the global `-q`/`-v` flags; quiet wins.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints one diagnostic line.
///
/// Mismatches and unverifiable entries are always shown; skipped files and
/// directories only in verbose mode.
pub fn diagnostic(diagnostic: &Diagnostic) {
    let line = diagnostic.to_string();
    match diagnostic.kind {
        DiagnosticKind::Mismatch => eprintln!("{}", line.red()),
        DiagnosticKind::Unverifiable
        | DiagnosticKind::MalformedLine
        | DiagnosticKind::Unrecordable => {
            eprintln!("{}", line.yellow());
        }
        DiagnosticKind::Unreadable
        | DiagnosticKind::DirectoryUnreadable
        | DiagnosticKind::Cancelled => verbose(&line),
    }
}

/// Prints a bold section label followed by `key = value` rows.
pub fn section(title: &str, rows: &[(String, String)]) {
    println!("{}", format!("[{title}]").bold());
    for (key, value) in rows {
        println!("  {} = {}", key.cyan(), value);
    }
}
