// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Wraps [`crate::line_discipline::Emulator`] as a full
//! [`crate::terminal::Terminal`] implementation, for hosts that feed a
//! master byte stream (a Windows input pump, a piped POSIX child) but have
//! no kernel line discipline of their own.

use std::time::Duration;

use crate::error::{Result, TermError};
use crate::line_discipline::{Emulator, SlavePipe};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::signal::{Handler, Signal};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};

#[derive(Debug)]
struct SlaveReader {
    pipe: SlavePipe,
}

impl Reader for SlaveReader {
    fn peek(&mut self) -> Result<Option<u8>> {
        // `SlavePipe` doesn't expose a non-destructive peek; pop and
        // immediately requeue works because this reader is single-consumer.
        match self.pipe.pop() {
            Some(b) => {
                self.pipe.push(&[b]);
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    fn read(&mut self) -> Result<u8> { self.pipe.pop().ok_or(TermError::Closed) }

    fn read_timeout(&mut self, _timeout: Duration) -> Result<Option<u8>> { Ok(self.pipe.pop()) }

    fn clear(&mut self) -> Result<()> {
        while self.pipe.pop().is_some() {}
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MasterWriter {
    buffer: Vec<u8>,
    pending: Vec<u8>,
}

impl Writer for MasterWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        if bytes.contains(&b'\n') {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.pending.append(&mut self.buffer);
        Ok(())
    }
}

/// `spec.md` §4.3's "Line-discipline emulator" variant / §4.6's subject.
#[derive(Debug)]
pub struct LineDisciplineTerminal {
    emulator: Emulator,
    reader: SlaveReader,
    writer: MasterWriter,
    size: Size,
    closed: bool,
}

impl LineDisciplineTerminal {
    #[must_use]
    pub fn new(attrs: Attributes, size: Size) -> Self {
        LineDisciplineTerminal {
            emulator: Emulator::new(attrs),
            reader: SlaveReader { pipe: SlavePipe::new() },
            writer: MasterWriter::default(),
            size,
            closed: false,
        }
    }

    /// Feeds one byte arriving from the master (e.g. a Windows input-pump
    /// thread or a piped child's stdout) into the emulator, queuing the
    /// processed byte for the application's reader and any echoed bytes
    /// for the master-facing writer.
    pub fn feed_master_byte(&mut self, byte: u8) {
        let result = self.emulator.feed_master_byte(byte);
        self.reader.pipe.push(&result.to_slave);
        if !result.echo_to_master.is_empty() {
            self.writer.pending.extend_from_slice(&result.echo_to_master);
        }
    }

    /// Drains bytes the emulator has queued to send back toward the
    /// master (echo output, and anything written by the application
    /// through [`Terminal::writer`]).
    pub fn drain_to_master(&mut self) -> Vec<u8> { std::mem::take(&mut self.writer.pending) }
}

impl Terminal for LineDisciplineTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.reader }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.writer }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        Ok(self.emulator.attributes().clone())
    }

    fn set_attributes(&mut self, attrs: Attributes) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        self.emulator.set_attributes(attrs);
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

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.emulator.signals().install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let snapshot = self.emulator.attributes().clone();
        self.emulator.set_attributes(snapshot.clone().into_raw());
        Ok(snapshot)
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

    fn color_depth(&self) -> ColorDepth { ColorDepth::Ansi256 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeding_bytes_populates_reader() {
        let mut term = LineDisciplineTerminal::new(Attributes::cooked(), Size::default());
        term.feed_master_byte(b'h');
        term.feed_master_byte(b'i');
        assert_eq!(term.reader().read().unwrap(), b'h');
        assert_eq!(term.reader().read().unwrap(), b'i');
    }
}
