// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The polymorphic terminal handle, per `spec.md` §4.3.
//!
//! Grounded in `spec.md` §9's "dynamic polymorphism over terminal variants
//! -> express as a trait with a small closed set of implementations" design
//! note, and the general preference for a small trait surface
//! (`core::pty::PtyReadWriteOutputDevice`-style) over an open plugin system.

use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::signal::{Handler, Signal};
use crate::terminal::size::Size;

/// Mouse-tracking protocol, per `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseTracking {
    #[default]
    Off,
    /// DECSET 1000: button press/release only.
    Normal,
    /// DECSET 1002: button press/release plus drag.
    Button,
    /// DECSET 1003: every motion event.
    Any,
}

/// A non-blocking character source with peek, blocking read, timed read,
/// and discard-pending-input support.
pub trait Reader: fmt::Debug + Send {
    /// Returns the next decoded byte without consuming it, if one is
    /// already buffered.
    fn peek(&mut self) -> Result<Option<u8>>;

    /// Blocks until at least one byte is available.
    fn read(&mut self) -> Result<u8>;

    /// Blocks for at most `timeout`; returns `None` on expiry rather than
    /// an error, per `spec.md` §5 "Cancellation and timeouts".
    fn read_timeout(&mut self, timeout: Duration) -> Result<Option<u8>>;

    /// Discards any buffered, not-yet-consumed input.
    fn clear(&mut self) -> Result<()>;
}

/// A buffered sink that flushes on newline and on explicit [`Writer::flush`].
pub trait Writer: fmt::Debug + Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// A uniform handle over every supported terminal backend.
///
/// All operations that can fail do so with [`crate::error::TermError`];
/// operations on a closed terminal always fail with
/// [`crate::error::TermError::Closed`].
pub trait Terminal: fmt::Debug + Send {
    fn reader(&mut self) -> &mut dyn Reader;
    fn writer(&mut self) -> &mut dyn Writer;

    /// # Errors
    /// Fails if the terminal is closed or the host refuses the query.
    fn get_attributes(&self) -> Result<Attributes>;

    /// Applies `attrs` atomically.
    ///
    /// # Errors
    /// Fails if the terminal is closed, or with
    /// [`crate::error::TermError::UnsupportedOperation`] on variants that
    /// cannot change line-discipline state (e.g. [`crate::terminal::dummy::DummyTerminal`]).
    fn set_attributes(&mut self, attrs: Attributes) -> Result<()>;

    /// # Errors
    /// Fails if the terminal is closed.
    fn get_size(&self) -> Result<Size>;

    /// # Errors
    /// Fails with [`crate::error::TermError::UnsupportedOperation`] on
    /// hosts that cannot resize the physical device (system terminals).
    fn set_size(&mut self, size: Size) -> Result<()>;

    /// Installs `handler` for `signal`, returning the previously installed
    /// handler.
    fn handle(&self, signal: Signal, handler: Handler) -> Handler;

    /// Snapshots the current attributes, clears `ICANON | ECHO | IEXTEN |
    /// ISIG`, sets `VMIN=1, VTIME=0`, and returns the pre-raw snapshot so
    /// the caller (or `close()`) can restore it later.
    ///
    /// # Errors
    /// Fails if the terminal is closed or attributes cannot be queried or
    /// set.
    fn enter_raw_mode(&mut self) -> Result<Attributes>;

    /// Toggles mouse-event reporting, sending the matching DECSET/DECRST
    /// sequence and registering the incoming report forms in the input
    /// pipeline's key trie.
    ///
    /// # Errors
    /// Fails if the terminal is closed.
    fn set_mouse_tracking(&mut self, mode: MouseTracking) -> Result<()>;

    /// Toggles focus-in/focus-out reporting (DECSET 1004).
    ///
    /// # Errors
    /// Fails if the terminal is closed.
    fn set_focus_tracking(&mut self, enabled: bool) -> Result<()>;

    /// Toggles bracketed-paste mode (DECSET 2004).
    ///
    /// # Errors
    /// Fails if the terminal is closed.
    fn set_bracketed_paste(&mut self, enabled: bool) -> Result<()>;

    /// Suspends background input pumping. A no-op on POSIX variants, which
    /// read on demand rather than via a dedicated pump thread.
    ///
    /// # Errors
    /// Fails if the terminal is closed.
    fn pause(&mut self) -> Result<()>;

    /// Resumes a [`Terminal::pause`]d terminal.
    ///
    /// # Errors
    /// Fails if the terminal is closed.
    fn resume(&mut self) -> Result<()>;

    /// Restores the attribute snapshot taken at open, releases the input
    /// pump thread (if any) and unwinds signal registrations in reverse
    /// order. Idempotent: a second call is a no-op.
    ///
    /// # Errors
    /// Restoring attributes is best-effort; a failure is logged, not
    /// propagated, per `spec.md` §7.
    fn close(&mut self) -> Result<()>;

    /// The color precision this terminal's destination device supports,
    /// used by [`crate::style::AttributedString::to_ansi`] to degrade
    /// colors appropriately.
    fn color_depth(&self) -> ColorDepth;
}
