// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Terminal construction options (`spec.md` §6 "Configuration").

use std::env;

use crate::terminal::{Attributes, Size};

/// What to do with a raised signal when no caller handler is installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignalDisposition {
    /// Run the host default action.
    #[default]
    Default,
    /// Ignore the signal.
    Ignore,
}

/// Options recognized when constructing a [`crate::terminal::Terminal`].
///
/// Mirrors the `spec.md` §6 configuration table. Every field has a sensible
/// default so callers typically only override one or two.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Human-readable label, used only in diagnostics.
    pub name: String,
    /// Terminfo entry name to resolve via [`crate::capability::Database`].
    pub terminfo_type: String,
    /// Charset used for both input decoding and output encoding.
    pub encoding: Encoding,
    /// Whether to install native OS signal handlers (POSIX) vs. rely purely
    /// on the input pump translating control sequences (used by embedded
    /// emulators that must not touch process-wide signal state).
    pub native_signals: bool,
    /// What unhandled signals should do.
    pub signal_disposition: SignalDisposition,
    /// Start the terminal without pumping input (Windows input-pump thread
    /// variants only; POSIX terminals read on demand regardless).
    pub paused: bool,
    /// Require a real controlling tty; constructing a system terminal
    /// without one returns [`crate::error::TermError::NotATerminal`].
    pub system: bool,
    /// Initial attributes to apply when opening a fresh PTY.
    pub initial_attributes: Option<Attributes>,
    /// Initial size to apply when opening a fresh PTY.
    pub initial_size: Option<Size>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let discovered = discover_from_env();
        TerminalConfig {
            name: "termcraft".to_owned(),
            terminfo_type: discovered.term.unwrap_or_else(|| "xterm-256color".to_owned()),
            encoding: discovered.encoding,
            native_signals: true,
            signal_disposition: SignalDisposition::Default,
            paused: false,
            system: true,
            initial_attributes: None,
            initial_size: None,
        }
    }
}

/// Charset used for terminal I/O. Only UTF-8 is fully supported; other
/// values are recorded so callers can detect and reject legacy locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Other,
}

/// Values discovered by reading the environment, per `spec.md` §6.
#[derive(Debug, Clone, Default)]
pub struct EnvDiscovery {
    pub term: Option<String>,
    pub colorterm: Option<String>,
    pub columns: Option<u16>,
    pub lines: Option<u16>,
    pub encoding: Encoding,
    pub terminfo_dir: Option<String>,
    pub terminfo_dirs: Vec<String>,
}

/// Read `TERM`, `COLORTERM`, `COLUMNS`, `LINES`, `LANG`/`LC_*`,
/// `TERMINFO`/`TERMINFO_DIRS` the way `spec.md` §6 lists them.
#[must_use]
pub fn discover_from_env() -> EnvDiscovery {
    let term = env::var("TERM").ok();
    let colorterm = env::var("COLORTERM").ok();
    let columns = env::var("COLUMNS").ok().and_then(|s| s.parse().ok());
    let lines = env::var("LINES").ok().and_then(|s| s.parse().ok());

    let lang_like = env::var("LC_ALL")
        .or_else(|_| env::var("LC_CTYPE"))
        .or_else(|_| env::var("LANG"))
        .ok();
    let encoding = match lang_like.as_deref() {
        Some(s) if s.to_ascii_uppercase().contains("UTF-8") || s.to_ascii_uppercase().contains("UTF8") => {
            Encoding::Utf8
        }
        Some(_) => Encoding::Other,
        None => Encoding::Utf8,
    };

    let terminfo_dir = env::var("TERMINFO").ok();
    let terminfo_dirs = env::var("TERMINFO_DIRS")
        .ok()
        .map(|s| s.split(':').map(str::to_owned).collect())
        .unwrap_or_default();

    EnvDiscovery {
        term,
        colorterm,
        columns,
        lines,
        encoding,
        terminfo_dir,
        terminfo_dirs,
    }
}
