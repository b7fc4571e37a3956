// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! In-memory terminal doubles for unit and integration tests.
//!
//! Mirrors a `test_fixtures` crate: mock I/O types that
//! implement the same trait the real backends do, rather than hand-rolled
//! `TcpStream`/file based fixtures.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Result, TermError};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::signal::{Handler, Signal, SignalRegistry};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Writer};

/// An in-memory duplex byte stream: bytes pushed with
/// [`MockDuplex::feed_input`] are what [`Reader`] calls observe; bytes
/// written through [`Writer`] accumulate in `output` for assertions.
#[derive(Debug, Default)]
pub struct MockDuplex {
    input: VecDeque<u8>,
    pub output: Vec<u8>,
    closed: bool,
}

impl MockDuplex {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn feed_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    #[must_use]
    pub fn take_output(&mut self) -> Vec<u8> { std::mem::take(&mut self.output) }
}

impl Reader for MockDuplex {
    fn peek(&mut self) -> Result<Option<u8>> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.input.front().copied())
    }

    fn read(&mut self) -> Result<u8> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.input.pop_front().ok_or(TermError::Closed)
    }

    fn read_timeout(&mut self, _timeout: Duration) -> Result<Option<u8>> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.input.pop_front())
    }

    fn clear(&mut self) -> Result<()> {
        self.input.clear();
        Ok(())
    }
}

impl Writer for MockDuplex {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// A fully in-memory [`crate::terminal::Terminal`] for tests that only
/// need to exercise the attribute/size/signal bookkeeping, the styled-text
/// serializer, or the Display engine, without a real tty, PTY, or console.
#[derive(Debug)]
pub struct StubTerminal {
    duplex: MockDuplex,
    attributes: Attributes,
    size: Size,
    signals: SignalRegistry,
    depth: ColorDepth,
    closed: bool,
}

impl StubTerminal {
    #[must_use]
    pub fn new(depth: ColorDepth) -> Self {
        StubTerminal {
            duplex: MockDuplex::new(),
            attributes: Attributes::cooked(),
            size: Size::default(),
            signals: SignalRegistry::new(),
            depth,
            closed: false,
        }
    }

    pub fn feed_input(&mut self, bytes: &[u8]) { self.duplex.feed_input(bytes); }

    #[must_use]
    pub fn take_output(&mut self) -> Vec<u8> { self.duplex.take_output() }
}

impl crate::terminal::traits::Terminal for StubTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.duplex }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.duplex }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.attributes.clone())
    }

    fn set_attributes(&mut self, attrs: Attributes) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.attributes = attrs;
        Ok(())
    }

    fn get_size(&self) -> Result<Size> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.size)
    }

    fn set_size(&mut self, size: Size) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.size = size;
        Ok(())
    }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.signals.install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let snapshot = self.attributes.clone();
        self.attributes = self.attributes.clone().into_raw();
        Ok(snapshot)
    }

    fn set_mouse_tracking(&mut self, _mode: MouseTracking) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(())
    }

    fn set_focus_tracking(&mut self, _enabled: bool) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(())
    }

    fn set_bracketed_paste(&mut self, _enabled: bool) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> { Ok(()) }

    fn resume(&mut self) -> Result<()> { Ok(()) }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { self.depth }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::traits::Terminal;

    #[test]
    fn closed_stub_rejects_operations() {
        let mut term = StubTerminal::new(ColorDepth::Ansi256);
        term.close().unwrap();
        assert!(matches!(term.get_size(), Err(TermError::Closed)));
    }

    #[test]
    fn enter_raw_mode_returns_snapshot_and_mutates() {
        let mut term = StubTerminal::new(ColorDepth::Ansi256);
        let snapshot = term.enter_raw_mode().unwrap();
        assert_eq!(snapshot, Attributes::cooked());
        assert_ne!(term.get_attributes().unwrap(), snapshot);
    }
}
