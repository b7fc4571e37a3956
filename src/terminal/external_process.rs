// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! External-process terminal variant: shells out to `stty` for attribute
//! manipulation on hosts where direct syscalls are unavailable (e.g. a
//! sandboxed process without `CAP_SYS_TTYCONFIG`-equivalent access, or a
//! host where `rustix::termios` is deliberately disabled).
//!
//! Grounded in `spec.md` §4.3's explicit naming of this variant; no
//! sibling terminal crates shell out to `stty`, so the process-spawn and output
//! parsing pattern here follows that same general preference
//! for parsing well-known CLI tool output line-by-line rather than
//! regex-matching the whole blob (seen in its `cmdr` crate's git-porcelain
//! parsing).

use std::process::Command;
use std::time::Duration;

use crate::error::{Result, TermError};
use crate::style::ColorDepth;
use crate::terminal::attributes::{Attributes, ControlChar, ControlFlags, InputFlags, LocalFlags, OutputFlags};
use crate::terminal::signal::{Handler, Signal, SignalRegistry};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};

#[derive(Debug, Default)]
struct StdioIo {
    buffer: Vec<u8>,
}

impl Reader for StdioIo {
    fn peek(&mut self) -> Result<Option<u8>> { Ok(None) }
    fn read(&mut self) -> Result<u8> { Err(TermError::Closed) }
    fn read_timeout(&mut self, _timeout: Duration) -> Result<Option<u8>> { Ok(None) }
    fn clear(&mut self) -> Result<()> { Ok(()) }
}

impl Writer for StdioIo {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        if bytes.contains(&b'\n') {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write as _;
        std::io::stdout().write_all(&self.buffer).map_err(TermError::from)?;
        std::io::stdout().flush().map_err(TermError::from)?;
        self.buffer.clear();
        Ok(())
    }
}

/// Parses `stty -a` output into an [`Attributes`] value. Tolerant of the
/// flag-name differences across BSD/GNU `stty` (unknown tokens are
/// ignored, per `spec.md` §9's "treat unknown flags as ignored rather than
/// as errors").
#[must_use]
pub fn parse_stty_output(output: &str) -> Attributes {
    let mut input = InputFlags::empty();
    let mut out = OutputFlags::empty();
    let mut control = ControlFlags::empty();
    let mut local = LocalFlags::empty();
    let mut control_chars = std::collections::HashMap::new();

    for token in output.split_whitespace() {
        let (name, negated) = match token.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (token, false),
        };
        macro_rules! flag {
            ($set:expr, $bit:expr) => {
                if negated {
                    $set.remove($bit);
                } else {
                    $set.insert($bit);
                }
            };
        }
        match name {
            "icrnl" => flag!(input, InputFlags::ICRNL),
            "ixon" => flag!(input, InputFlags::IXON),
            "ixoff" => flag!(input, InputFlags::IXOFF),
            "istrip" => flag!(input, InputFlags::ISTRIP),
            "inlcr" => flag!(input, InputFlags::INLCR),
            "igncr" => flag!(input, InputFlags::IGNCR),
            "brkint" => flag!(input, InputFlags::BRKINT),
            "ignbrk" => flag!(input, InputFlags::IGNBRK),
            "opost" => flag!(out, OutputFlags::OPOST),
            "onlcr" => flag!(out, OutputFlags::ONLCR),
            "ocrnl" => flag!(out, OutputFlags::OCRNL),
            "cs8" => control.insert(ControlFlags::CS8),
            "cs7" => control.insert(ControlFlags::CS7),
            "cstopb" => flag!(control, ControlFlags::CSTOPB),
            "parenb" => flag!(control, ControlFlags::PARENB),
            "hupcl" => flag!(control, ControlFlags::HUPCL),
            "clocal" => flag!(control, ControlFlags::CLOCAL),
            "icanon" => flag!(local, LocalFlags::ICANON),
            "echo" => flag!(local, LocalFlags::ECHO),
            "echoe" => flag!(local, LocalFlags::ECHOE),
            "echok" => flag!(local, LocalFlags::ECHOK),
            "echonl" => flag!(local, LocalFlags::ECHONL),
            "isig" => flag!(local, LocalFlags::ISIG),
            "iexten" => flag!(local, LocalFlags::IEXTEN),
            "noflsh" => flag!(local, LocalFlags::NOFLSH),
            "tostop" => flag!(local, LocalFlags::TOSTOP),
            _ => {}
        }
    }

    // `stty -a` prints control characters as `name = value;` pairs on
    // GNU systems; scan for the ones spec.md §3 names.
    for (needle, which) in [
        ("intr", ControlChar::VIntr),
        ("quit", ControlChar::VQuit),
        ("erase", ControlChar::VErase),
        ("kill", ControlChar::VKill),
        ("eof", ControlChar::VEof),
        ("min", ControlChar::VMin),
        ("time", ControlChar::VTime),
    ] {
        if let Some(pos) = output.find(&format!("{needle} = ")) {
            let rest = &output[pos + needle.len() + 3..];
            let value_str: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(value) = value_str.parse::<u8>() {
                control_chars.insert(which, value);
            }
        }
    }

    Attributes { input, output: out, control, local, control_chars }
}

/// `spec.md` §4.3's "External-process terminal" variant.
#[derive(Debug)]
pub struct SttyTerminal {
    io: StdioIo,
    signals: SignalRegistry,
    closed: bool,
}

impl SttyTerminal {
    #[must_use]
    pub fn new() -> Self { SttyTerminal { io: StdioIo::default(), signals: SignalRegistry::new(), closed: false } }

    fn run_stty(args: &[&str]) -> Result<String> {
        let output = Command::new("stty")
            .args(args)
            .output()
            .map_err(TermError::from)?;
        if !output.status.success() {
            return Err(TermError::Io { source: std::io::Error::other("stty exited with a failure status") });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for SttyTerminal {
    fn default() -> Self { Self::new() }
}

impl Terminal for SttyTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.io }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.io }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let raw = Self::run_stty(&["-a"])?;
        Ok(parse_stty_output(&raw))
    }

    fn set_attributes(&mut self, attrs: Attributes) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let mut args = Vec::new();
        if attrs.local.contains(LocalFlags::ICANON) { args.push("icanon"); } else { args.push("-icanon"); }
        if attrs.local.contains(LocalFlags::ECHO) { args.push("echo"); } else { args.push("-echo"); }
        if attrs.local.contains(LocalFlags::ISIG) { args.push("isig"); } else { args.push("-isig"); }
        Self::run_stty(&args)?;
        Ok(())
    }

    fn get_size(&self) -> Result<Size> {
        let raw = Self::run_stty(&["size"])?;
        let mut parts = raw.split_whitespace();
        let rows: u16 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(24);
        let cols: u16 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(80);
        Ok(Size::new(rows, cols))
    }

    fn set_size(&mut self, _size: Size) -> Result<()> {
        Err(TermError::UnsupportedOperation("stty has no portable subcommand to set window size"))
    }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.signals.install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> {
        let snapshot = self.get_attributes()?;
        Self::run_stty(&["raw"])?;
        Ok(snapshot)
    }

    fn set_mouse_tracking(&mut self, _mode: MouseTracking) -> Result<()> {
        Err(TermError::UnsupportedOperation("mouse tracking requires a direct escape-sequence writer"))
    }

    fn set_focus_tracking(&mut self, _enabled: bool) -> Result<()> {
        Err(TermError::UnsupportedOperation("focus tracking requires a direct escape-sequence writer"))
    }

    fn set_bracketed_paste(&mut self, _enabled: bool) -> Result<()> {
        Err(TermError::UnsupportedOperation("bracketed paste requires a direct escape-sequence writer"))
    }

    fn pause(&mut self) -> Result<()> { Ok(()) }

    fn resume(&mut self) -> Result<()> { Ok(()) }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let _ = Self::run_stty(&["sane"]);
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { ColorDepth::Ansi256 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_flags_and_ignores_unknown_tokens() {
        let attrs = parse_stty_output("speed 38400 baud; rows 40; columns 120; -icanon -echo oxtabs");
        assert!(!attrs.local.contains(LocalFlags::ICANON));
        assert!(!attrs.local.contains(LocalFlags::ECHO));
    }

    #[test]
    fn parses_control_char_values() {
        let attrs = parse_stty_output("intr = ^C; min = 1; time = 0;");
        assert_eq!(attrs.control_chars.get(&ControlChar::VMin), Some(&1));
        assert_eq!(attrs.control_chars.get(&ControlChar::VTime), Some(&0));
    }
}
