// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! A terminal that discards output, yields no input, and reports a fixed
//! size. Used where no controlling device is available (e.g. output
//! redirected to a file, tests, CI).

use std::time::Duration;

use crate::error::{Result, TermError};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::signal::{Handler, Signal, SignalRegistry};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};

#[derive(Debug, Default)]
struct DummyIo;

impl Reader for DummyIo {
    fn peek(&mut self) -> Result<Option<u8>> { Ok(None) }
    fn read(&mut self) -> Result<u8> { Err(TermError::Closed) }
    fn read_timeout(&mut self, _timeout: Duration) -> Result<Option<u8>> { Ok(None) }
    fn clear(&mut self) -> Result<()> { Ok(()) }
}

impl Writer for DummyIo {
    fn write(&mut self, _bytes: &[u8]) -> Result<()> { Ok(()) }
    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// `spec.md` §4.3's "Dummy" variant.
#[derive(Debug)]
pub struct DummyTerminal {
    io: DummyIo,
    attributes: Attributes,
    size: Size,
    signals: SignalRegistry,
    closed: bool,
}

impl DummyTerminal {
    #[must_use]
    pub fn new(size: Size) -> Self {
        DummyTerminal {
            io: DummyIo,
            attributes: Attributes::cooked(),
            size,
            signals: SignalRegistry::new(),
            closed: false,
        }
    }
}

impl Default for DummyTerminal {
    fn default() -> Self { DummyTerminal::new(Size::default()) }
}

impl Terminal for DummyTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.io }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.io }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.attributes.clone())
    }

    fn set_attributes(&mut self, _attrs: Attributes) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Err(TermError::UnsupportedOperation("set_attributes on a dummy terminal"))
    }

    fn get_size(&self) -> Result<Size> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.size)
    }

    fn set_size(&mut self, _size: Size) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Err(TermError::UnsupportedOperation("set_size on a dummy terminal"))
    }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.signals.install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.attributes.clone())
    }

    fn set_mouse_tracking(&mut self, _mode: MouseTracking) -> Result<()> { Ok(()) }

    fn set_focus_tracking(&mut self, _enabled: bool) -> Result<()> { Ok(()) }

    fn set_bracketed_paste(&mut self, _enabled: bool) -> Result<()> { Ok(()) }

    fn pause(&mut self) -> Result<()> { Ok(()) }

    fn resume(&mut self) -> Result<()> { Ok(()) }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { ColorDepth::Ansi16 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_is_unsupported() {
        let mut term = DummyTerminal::default();
        assert!(matches!(term.set_size(Size::new(10, 10)), Err(TermError::UnsupportedOperation(_))));
    }

    #[test]
    fn reader_yields_no_input() {
        let mut term = DummyTerminal::default();
        assert_eq!(term.reader().peek().unwrap(), None);
    }
}
