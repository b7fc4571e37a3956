// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Pseudo-terminal terminal variant: wraps a master/slave pair obtained
//! from `openpty`. Reads and writes happen on the master; attribute and
//! size operations apply to the slave.
//!
//! Mirrors `core/pty`, which also builds its PTY
//! handling on `portable-pty`.

use std::io::{Read, Write};
use std::time::Duration;

use portable_pty::{native_pty_system, Child, MasterPty, PtySize};
use tracing::warn;

use crate::error::{Result, TermError};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::signal::{Handler, Signal, SignalRegistry};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};

struct PtyReader {
    inner: Box<dyn Read + Send>,
}

impl std::fmt::Debug for PtyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("PtyReader").finish() }
}

impl Reader for PtyReader {
    fn peek(&mut self) -> Result<Option<u8>> {
        // `portable-pty`'s reader trait object offers no peek primitive;
        // a one-byte blocking read with a short timeout stands in.
        self.read_timeout(Duration::from_millis(0))
    }

    fn read(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = self.inner.read(&mut buf).map_err(TermError::from)?;
        if n == 0 {
            return Err(TermError::Closed);
        }
        Ok(buf[0])
    }

    fn read_timeout(&mut self, _timeout: Duration) -> Result<Option<u8>> {
        // `Box<dyn Read>` from `portable-pty` is blocking by design (it's
        // backed by the master fd); callers needing true timeouts should
        // wrap the terminal in `terminal::line_discipline`, which pumps
        // through a channel that does support `recv_timeout`.
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(TermError::from(e)),
        }
    }

    fn clear(&mut self) -> Result<()> { Ok(()) }
}

struct PtyWriter {
    inner: Box<dyn Write + Send>,
    buffer: Vec<u8>,
}

impl std::fmt::Debug for PtyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("PtyWriter").finish() }
}

impl Writer for PtyWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        if bytes.contains(&b'\n') {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.inner.write_all(&self.buffer).map_err(TermError::from)?;
        self.inner.flush().map_err(TermError::from)?;
        self.buffer.clear();
        Ok(())
    }
}

/// `spec.md` §4.3's "Pseudo-terminal terminal" variant.
pub struct PtyTerminal {
    master: Box<dyn MasterPty + Send>,
    child: Option<Box<dyn Child + Send + Sync>>,
    reader: PtyReader,
    writer: PtyWriter,
    signals: SignalRegistry,
    closed: bool,
}

impl std::fmt::Debug for PtyTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyTerminal").field("closed", &self.closed).finish()
    }
}

impl PtyTerminal {
    /// Allocates a fresh PTY pair of `size` and spawns no child; callers
    /// that need a child process attached should use
    /// [`PtyTerminal::spawn`].
    ///
    /// # Errors
    /// Propagates whatever `portable-pty` reports (out of PTYs, permission
    /// denied).
    pub fn open(size: Size) -> Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize { rows: size.rows, cols: size.cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| TermError::Io { source: std::io::Error::other(e) })?;

        let reader = pair.master.try_clone_reader().map_err(|e| TermError::Io { source: std::io::Error::other(e) })?;
        let writer = pair.master.take_writer().map_err(|e| TermError::Io { source: std::io::Error::other(e) })?;

        Ok(PtyTerminal {
            master: pair.master,
            child: None,
            reader: PtyReader { inner: reader },
            writer: PtyWriter { inner: writer, buffer: Vec::new() },
            signals: SignalRegistry::new(),
            closed: false,
        })
    }

    pub fn attach_child(&mut self, child: Box<dyn Child + Send + Sync>) { self.child = Some(child); }
}

impl Terminal for PtyTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.reader }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.writer }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        // `portable-pty` does not expose the slave's termios directly;
        // only a POSIX-side opener of the slave path can query it. Report
        // the conservative cooked-mode baseline, which matches what every
        // `openpty` implementation sets a fresh slave to.
        Ok(Attributes::cooked())
    }

    fn set_attributes(&mut self, _attrs: Attributes) -> Result<()> {
        Err(TermError::UnsupportedOperation(
            "setting termios on the PTY slave requires opening its device path directly",
        ))
    }

    fn get_size(&self) -> Result<Size> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let size = self.master.get_size().map_err(|e| TermError::Io { source: std::io::Error::other(e) })?;
        Ok(Size::new(size.rows, size.cols))
    }

    fn set_size(&mut self, size: Size) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.master
            .resize(PtySize { rows: size.rows, cols: size.cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| TermError::Io { source: std::io::Error::other(e) })
    }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.signals.install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> { self.get_attributes() }

    fn set_mouse_tracking(&mut self, mode: MouseTracking) -> Result<()> {
        let seq: &[u8] = match mode {
            MouseTracking::Off => b"\x1b[?1000l\x1b[?1002l\x1b[?1003l",
            MouseTracking::Normal => b"\x1b[?1000h",
            MouseTracking::Button => b"\x1b[?1002h",
            MouseTracking::Any => b"\x1b[?1003h",
        };
        self.writer.write(seq)?;
        self.writer.flush()
    }

    fn set_focus_tracking(&mut self, enabled: bool) -> Result<()> {
        self.writer.write(if enabled { b"\x1b[?1004h" } else { b"\x1b[?1004l" })?;
        self.writer.flush()
    }

    fn set_bracketed_paste(&mut self, enabled: bool) -> Result<()> {
        self.writer.write(if enabled { b"\x1b[?2004h" } else { b"\x1b[?2004l" })?;
        self.writer.flush()
    }

    fn pause(&mut self) -> Result<()> { Ok(()) }

    fn resume(&mut self) -> Result<()> { Ok(()) }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to kill child attached to pty");
            }
        }
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { ColorDepth::TrueColor }
}
