// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Error kinds surfaced by the terminal core.
//!
//! See `spec.md` §7. Failures at the platform boundary are wrapped once and
//! surfaced to the caller; they are never silently swallowed. Recoverable
//! parser states (translator buffer overflow, unknown CSI final byte) are
//! handled locally by the parser itself and never reach this type. Signals
//! are never represented as errors.

use std::io;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, TermError>;

/// Every error the terminal core can surface to a caller.
#[derive(thiserror::Error, Debug)]
pub enum TermError {
    /// A system terminal was requested but the host has no controlling tty.
    #[error("no controlling terminal is attached to this process")]
    NotATerminal,

    /// The requested operation is not supported by this terminal variant.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// A capability lookup failed, either because the entry is missing from
    /// the database or because it's absent for the resolved terminal type.
    #[error("capability absent: {0}")]
    CapabilityAbsent(String),

    /// A parameterized capability string could not be evaluated.
    #[error("malformed %-directive at byte {offset} in capability string: {detail}")]
    EvaluationFailure { offset: usize, detail: String },

    /// Input bytes did not extend any bound sequence and no catch-all sink
    /// was configured for the binding reader.
    #[error("input byte sequence {0:02x?} did not extend any binding")]
    InvalidSequence(Vec<u8>),

    /// The terminal has already been closed.
    #[error("operation attempted on a closed terminal")]
    Closed,

    /// A wrapped host I/O failure, preserving the native error code.
    #[error("host I/O failure: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TermError {
    /// The native OS error code behind an [`TermError::Io`], if any.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            TermError::Io { source } => source.raw_os_error(),
            _ => None,
        }
    }
}
