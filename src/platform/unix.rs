// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! POSIX platform glue shared by [`crate::terminal::PosixTerminal`] and
//! [`crate::terminal::PtyTerminal`]: wiring a [`SignalRegistry`] up to real
//! OS signals (`spec.md` §4.8, component 8).
//!
//! Window-size queries and PTY allocation are handled the way
//! `core/pty` module, but those two variants already perform them inline
//! via `rustix::termios::tcgetwinsize`/`portable_pty::native_pty_system`
//! directly at their single call site, so this module's job narrows to the
//! one piece no terminal variant wires up on its own: turning `SIGINT` et
//! al. into a dispatch into the registry the `Terminal::handle` API
//! exposes.

use std::sync::Arc;

use crate::terminal::signal::{Signal, SignalRegistry, SignalToken};

/// The signals every POSIX terminal variant registers for at open, per
/// `spec.md` §4.8.
pub const DEFAULT_SIGNALS: [Signal; 6] =
    [Signal::Int, Signal::Quit, Signal::Tstp, Signal::Cont, Signal::Winch, Signal::Info];

/// Registers an OS-level handler for each of [`DEFAULT_SIGNALS`] that
/// forwards the raise into `registry.dispatch`, returning the scoped
/// tokens. Callers store these on the terminal struct and drop them (in
/// reverse order) inside `close()`.
///
/// A registration failure for one signal (e.g. a sandboxed host refusing
/// `SIGTSTP`) is logged and skipped rather than aborting the rest; the
/// terminal still functions, just without that one signal's delivery.
#[must_use]
pub fn register_default_signal_tokens(registry: &Arc<SignalRegistry>) -> Vec<SignalToken> {
    let mut tokens = Vec::with_capacity(DEFAULT_SIGNALS.len());
    for signal in DEFAULT_SIGNALS {
        let registry = Arc::clone(registry);
        match SignalToken::register(signal, move || registry.dispatch(signal)) {
            Ok(token) => tokens.push(token),
            Err(error) => {
                tracing::warn!(?signal, %error, "failed to register OS signal handler");
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_a_token_per_default_signal() {
        let registry = Arc::new(SignalRegistry::new());
        let tokens = register_default_signal_tokens(&registry);
        assert!(tokens.len() <= DEFAULT_SIGNALS.len());
    }
}
