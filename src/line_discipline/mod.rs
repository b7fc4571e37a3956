// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! A software line discipline: the `spec.md` §4.6 byte-processing rules
//! that a POSIX kernel's tty driver applies, reimplemented for hosts whose
//! kernel doesn't do this (Windows, piped POSIX stdio feeding a
//! subprocess).
//!
//! This module exposes [`Emulator`] standalone, usable without
//! [`crate::terminal::Terminal`] at all (e.g. to preprocess a byte stream
//! read from a non-tty pipe before it reaches application code);
//! [`crate::terminal::line_discipline::LineDisciplineTerminal`] wraps it as
//! a full terminal variant.
//!
//! Grounded in `spec.md` §9's open question: the interaction between
//! `raise()` and `NOFLSH` is deliberately left as "flush is suppressed"
//! rather than performed, to avoid the deadlock the original source also
//! sidesteps by skipping the slave-pipe flush on signal raise.

use std::collections::VecDeque;

use crate::terminal::attributes::{Attributes, ControlChar, InputFlags, LocalFlags, OutputFlags};
use crate::terminal::signal::{Signal, SignalRegistry};

/// Bytes produced by feeding one byte from the master into the emulator:
/// what (if anything) was appended to the slave pipe, and what (if
/// anything) must be echoed back out to the master.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedResult {
    pub to_slave: Vec<u8>,
    pub echo_to_master: Vec<u8>,
    pub raised: Option<Signal>,
}

/// Software line discipline over a given [`Attributes`] configuration.
#[derive(Debug)]
pub struct Emulator {
    attrs: Attributes,
    signals: SignalRegistry,
    /// Set after a bare CR under `INORMEOL`, so the immediately following
    /// LF is swallowed rather than duplicated.
    swallow_next_lf: bool,
}

impl Emulator {
    #[must_use]
    pub fn new(attrs: Attributes) -> Self {
        Emulator { attrs, signals: SignalRegistry::new(), swallow_next_lf: false }
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes { &self.attrs }

    pub fn set_attributes(&mut self, attrs: Attributes) { self.attrs = attrs; }

    #[must_use]
    pub fn signals(&self) -> &SignalRegistry { &self.signals }

    /// Processes one byte arriving from the master, per `spec.md` §4.6
    /// steps 1-4. Step 5 (flush) is the caller's responsibility, since it
    /// depends on the transport (pipe, channel, PTY) wrapping this
    /// emulator.
    pub fn feed_master_byte(&mut self, byte: u8) -> FeedResult {
        if let Some(signal) = self.matching_signal(byte) {
            self.signals.dispatch(signal);
            // NOFLSH interaction left as "flush suppressed", per the
            // design note above: we never issue the slave-pipe flush a
            // real tty driver would perform here.
            return FeedResult { to_slave: Vec::new(), echo_to_master: Vec::new(), raised: Some(signal) };
        }

        let translated = self.translate_cr_lf(byte);
        let Some(translated) = translated else {
            return FeedResult::default();
        };

        let echo = if self.attrs.local.contains(LocalFlags::ECHO) {
            self.process_output_byte(translated)
        } else {
            Vec::new()
        };

        FeedResult { to_slave: vec![translated], echo_to_master: echo, raised: None }
    }

    fn matching_signal(&self, byte: u8) -> Option<Signal> {
        if !self.attrs.local.contains(LocalFlags::ISIG) {
            return None;
        }
        let chars = &self.attrs.control_chars;
        if chars.get(&ControlChar::VIntr) == Some(&byte) {
            return Some(Signal::Int);
        }
        if chars.get(&ControlChar::VQuit) == Some(&byte) {
            return Some(Signal::Quit);
        }
        if chars.get(&ControlChar::VSusp) == Some(&byte) {
            return Some(Signal::Tstp);
        }
        if chars.get(&ControlChar::VStatus) == Some(&byte) {
            return Some(Signal::Info);
        }
        None
    }

    /// `spec.md` §4.6 step 2: CR/NL translation on input.
    fn translate_cr_lf(&mut self, byte: u8) -> Option<u8> {
        if self.swallow_next_lf {
            self.swallow_next_lf = false;
            if byte == b'\n' {
                return None;
            }
        }

        if self.attrs.input.contains(InputFlags::INORMEOL) && byte == b'\r' {
            self.swallow_next_lf = true;
            return Some(b'\n');
        }
        if byte == b'\r' {
            if self.attrs.input.contains(InputFlags::IGNCR) {
                return None;
            }
            if self.attrs.input.contains(InputFlags::ICRNL) {
                return Some(b'\n');
            }
            return Some(byte);
        }
        if byte == b'\n' && self.attrs.input.contains(InputFlags::INLCR) {
            return Some(b'\r');
        }
        Some(byte)
    }

    /// `spec.md` §4.6 output processing: from slave to master, `OPOST &&
    /// ONLCR` turns LF into CR+LF.
    #[must_use]
    pub fn process_output_byte(&self, byte: u8) -> Vec<u8> {
        if byte == b'\n' && self.attrs.output.contains(OutputFlags::OPOST) && self.attrs.output.contains(OutputFlags::ONLCR) {
            vec![b'\r', b'\n']
        } else {
            vec![byte]
        }
    }
}

/// A byte-oriented in-memory slave pipe: what
/// [`crate::terminal::line_discipline::LineDisciplineTerminal`] hands the
/// application as its readable stream.
#[derive(Debug, Default)]
pub struct SlavePipe {
    queue: VecDeque<u8>,
}

impl SlavePipe {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, bytes: &[u8]) { self.queue.extend(bytes); }

    pub fn pop(&mut self) -> Option<u8> { self.queue.pop_front() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::attributes::ControlFlags;

    fn attrs_with(local: LocalFlags, input: InputFlags) -> Attributes {
        let mut a = Attributes::cooked();
        a.local = local;
        a.input = input;
        a.control = ControlFlags::CS8;
        a.control_chars.insert(ControlChar::VIntr, 0x03);
        a
    }

    #[test]
    fn icrnl_translates_cr_to_lf() {
        let mut emu = Emulator::new(attrs_with(LocalFlags::empty(), InputFlags::ICRNL));
        let result = emu.feed_master_byte(b'\r');
        assert_eq!(result.to_slave, vec![b'\n']);
    }

    #[test]
    fn sigint_byte_is_dropped_and_raises_signal() {
        let mut emu = Emulator::new(attrs_with(LocalFlags::ISIG, InputFlags::empty()));
        let result = emu.feed_master_byte(0x03);
        assert!(result.to_slave.is_empty());
        assert_eq!(result.raised, Some(Signal::Int));
    }

    #[test]
    fn full_scenario_crnl_then_sigint_then_byte() {
        // "\r A ctrl-C B" with ICRNL + ISIG/VINTR set should yield "\n A"
        // in the slave, raise INT exactly once, then deliver B.
        let mut emu = Emulator::new(attrs_with(LocalFlags::ISIG, InputFlags::ICRNL));
        let mut slave = SlavePipe::new();
        let mut raises = 0;

        for byte in [b'\r', b'A', 0x03, b'B'] {
            let result = emu.feed_master_byte(byte);
            slave.push(&result.to_slave);
            if result.raised.is_some() {
                raises += 1;
            }
        }

        let mut out = Vec::new();
        while let Some(b) = slave.pop() {
            out.push(b);
        }
        assert_eq!(out, vec![b'\n', b'A', b'B']);
        assert_eq!(raises, 1);
    }

    #[test]
    fn onlcr_expands_lf_to_crlf_on_output() {
        let emu = Emulator::new(attrs_with(LocalFlags::empty(), InputFlags::empty()));
        assert_eq!(emu.process_output_byte(b'\n'), vec![b'\r', b'\n']);
    }
}
