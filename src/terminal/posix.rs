// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The POSIX system-terminal variant: binds to the controlling tty's file
//! descriptors, uses `tcgetattr`/`tcsetattr` for attributes and
//! `ioctl(TIOCGWINSZ)`/`TIOCSWINSZ` for size.
//!
//! Mirrors `raw_mode_unix.rs` directly: the same
//! `rustix::termios` calls, the same snapshot-before-mutate discipline, and
//! the same `cfmakeraw`-derived flag clearing, generalized here from a
//! process-wide `LazyLock<Mutex<Option<Termios>>>` into a per-terminal
//! field so more than one `PosixTerminal` can exist (prior art only ever
//! has one, stdin).

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::sync::Arc;
use std::time::Duration;

use rustix::termios::{self, InputModes, LocalModes, OptionalActions, OutputModes, SpecialCodeIndex};
use tracing::warn;

use crate::error::{Result, TermError};
use crate::platform::unix::register_default_signal_tokens;
use crate::style::ColorDepth;
use crate::terminal::attributes::{Attributes, ControlChar, ControlFlags, InputFlags, LocalFlags, OutputFlags};
use crate::terminal::signal::{Handler, Signal, SignalRegistry, SignalToken};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};

/// Applies `attrs` onto `base`, which should be a termios value freshly
/// read via `tcgetattr` (so fields this crate doesn't model, like the
/// baud rate, are preserved rather than zeroed).
fn apply_attrs(base: &mut termios::Termios, attrs: &Attributes) {
    let t = base;
    t.input_modes = InputModes::empty();
    t.output_modes = OutputModes::empty();
    t.control_modes = rustix::termios::ControlModes::empty();
    t.local_modes = LocalModes::empty();

    macro_rules! carry {
        ($src_flags:expr, $src_bit:expr, $dst:expr, $dst_bit:expr) => {
            if $src_flags.contains($src_bit) {
                $dst.insert($dst_bit);
            }
        };
    }

    carry!(attrs.input, InputFlags::IGNBRK, t.input_modes, InputModes::IGNBRK);
    carry!(attrs.input, InputFlags::BRKINT, t.input_modes, InputModes::BRKINT);
    carry!(attrs.input, InputFlags::INPCK, t.input_modes, InputModes::INPCK);
    carry!(attrs.input, InputFlags::ISTRIP, t.input_modes, InputModes::ISTRIP);
    carry!(attrs.input, InputFlags::INLCR, t.input_modes, InputModes::INLCR);
    carry!(attrs.input, InputFlags::IGNCR, t.input_modes, InputModes::IGNCR);
    carry!(attrs.input, InputFlags::ICRNL, t.input_modes, InputModes::ICRNL);
    carry!(attrs.input, InputFlags::IXON, t.input_modes, InputModes::IXON);
    carry!(attrs.input, InputFlags::IXOFF, t.input_modes, InputModes::IXOFF);
    carry!(attrs.input, InputFlags::IXANY, t.input_modes, InputModes::IXANY);
    carry!(attrs.input, InputFlags::IMAXBEL, t.input_modes, InputModes::IMAXBEL);
    carry!(attrs.input, InputFlags::PARMRK, t.input_modes, InputModes::PARMRK);
    #[cfg(target_os = "linux")]
    carry!(attrs.input, InputFlags::IUTF8, t.input_modes, InputModes::IUTF8);

    carry!(attrs.output, OutputFlags::OPOST, t.output_modes, OutputModes::OPOST);
    carry!(attrs.output, OutputFlags::ONLCR, t.output_modes, OutputModes::ONLCR);
    carry!(attrs.output, OutputFlags::OCRNL, t.output_modes, OutputModes::OCRNL);
    carry!(attrs.output, OutputFlags::ONOCR, t.output_modes, OutputModes::ONOCR);
    carry!(attrs.output, OutputFlags::ONLRET, t.output_modes, OutputModes::ONLRET);
    carry!(attrs.output, OutputFlags::OFILL, t.output_modes, OutputModes::OFILL);
    carry!(attrs.output, OutputFlags::OFDEL, t.output_modes, OutputModes::OFDEL);

    t.control_modes.remove(rustix::termios::ControlModes::CSIZE | rustix::termios::ControlModes::PARENB);
    if attrs.control.contains(ControlFlags::CS5) {
        t.control_modes.insert(rustix::termios::ControlModes::CS5);
    } else if attrs.control.contains(ControlFlags::CS6) {
        t.control_modes.insert(rustix::termios::ControlModes::CS6);
    } else if attrs.control.contains(ControlFlags::CS7) {
        t.control_modes.insert(rustix::termios::ControlModes::CS7);
    } else {
        t.control_modes.insert(rustix::termios::ControlModes::CS8);
    }
    carry!(attrs.control, ControlFlags::CSTOPB, t.control_modes, rustix::termios::ControlModes::CSTOPB);
    carry!(attrs.control, ControlFlags::CREAD, t.control_modes, rustix::termios::ControlModes::CREAD);
    carry!(attrs.control, ControlFlags::PARENB, t.control_modes, rustix::termios::ControlModes::PARENB);
    carry!(attrs.control, ControlFlags::PARODD, t.control_modes, rustix::termios::ControlModes::PARODD);
    carry!(attrs.control, ControlFlags::HUPCL, t.control_modes, rustix::termios::ControlModes::HUPCL);
    carry!(attrs.control, ControlFlags::CLOCAL, t.control_modes, rustix::termios::ControlModes::CLOCAL);

    carry!(attrs.local, LocalFlags::ISIG, t.local_modes, LocalModes::ISIG);
    carry!(attrs.local, LocalFlags::ICANON, t.local_modes, LocalModes::ICANON);
    carry!(attrs.local, LocalFlags::ECHO, t.local_modes, LocalModes::ECHO);
    carry!(attrs.local, LocalFlags::ECHOE, t.local_modes, LocalModes::ECHOE);
    carry!(attrs.local, LocalFlags::ECHOK, t.local_modes, LocalModes::ECHOK);
    carry!(attrs.local, LocalFlags::ECHONL, t.local_modes, LocalModes::ECHONL);
    carry!(attrs.local, LocalFlags::ECHOCTL, t.local_modes, LocalModes::ECHOCTL);
    carry!(attrs.local, LocalFlags::ECHOKE, t.local_modes, LocalModes::ECHOKE);
    carry!(attrs.local, LocalFlags::NOFLSH, t.local_modes, LocalModes::NOFLSH);
    carry!(attrs.local, LocalFlags::TOSTOP, t.local_modes, LocalModes::TOSTOP);
    carry!(attrs.local, LocalFlags::IEXTEN, t.local_modes, LocalModes::IEXTEN);
    carry!(attrs.local, LocalFlags::PENDIN, t.local_modes, LocalModes::PENDIN);

    if let Some(&vmin) = attrs.control_chars.get(&ControlChar::VMin) {
        t.special_codes[SpecialCodeIndex::VMIN] = vmin;
    }
    if let Some(&vtime) = attrs.control_chars.get(&ControlChar::VTime) {
        t.special_codes[SpecialCodeIndex::VTIME] = vtime;
    }
    for (name, idx) in [
        (ControlChar::VIntr, SpecialCodeIndex::VINTR),
        (ControlChar::VQuit, SpecialCodeIndex::VQUIT),
        (ControlChar::VErase, SpecialCodeIndex::VERASE),
        (ControlChar::VKill, SpecialCodeIndex::VKILL),
        (ControlChar::VEof, SpecialCodeIndex::VEOF),
        (ControlChar::VStart, SpecialCodeIndex::VSTART),
        (ControlChar::VStop, SpecialCodeIndex::VSTOP),
        (ControlChar::VSusp, SpecialCodeIndex::VSUSP),
        (ControlChar::VReprint, SpecialCodeIndex::VREPRINT),
        (ControlChar::VWerase, SpecialCodeIndex::VWERASE),
        (ControlChar::VLnext, SpecialCodeIndex::VLNEXT),
        (ControlChar::VDiscard, SpecialCodeIndex::VDISCARD),
    ] {
        if let Some(&value) = attrs.control_chars.get(&name) {
            t.special_codes[idx] = value;
        }
    }
}

fn from_rustix(t: &termios::Termios) -> Attributes {
    let mut input = InputFlags::empty();
    if t.input_modes.contains(InputModes::IGNBRK) {
        input.insert(InputFlags::IGNBRK);
    }
    if t.input_modes.contains(InputModes::BRKINT) {
        input.insert(InputFlags::BRKINT);
    }
    if t.input_modes.contains(InputModes::INPCK) {
        input.insert(InputFlags::INPCK);
    }
    if t.input_modes.contains(InputModes::ISTRIP) {
        input.insert(InputFlags::ISTRIP);
    }
    if t.input_modes.contains(InputModes::INLCR) {
        input.insert(InputFlags::INLCR);
    }
    if t.input_modes.contains(InputModes::IGNCR) {
        input.insert(InputFlags::IGNCR);
    }
    if t.input_modes.contains(InputModes::ICRNL) {
        input.insert(InputFlags::ICRNL);
    }
    if t.input_modes.contains(InputModes::IXON) {
        input.insert(InputFlags::IXON);
    }
    if t.input_modes.contains(InputModes::IXOFF) {
        input.insert(InputFlags::IXOFF);
    }
    if t.input_modes.contains(InputModes::IXANY) {
        input.insert(InputFlags::IXANY);
    }
    if t.input_modes.contains(InputModes::IMAXBEL) {
        input.insert(InputFlags::IMAXBEL);
    }
    if t.input_modes.contains(InputModes::PARMRK) {
        input.insert(InputFlags::PARMRK);
    }

    let mut output = OutputFlags::empty();
    if t.output_modes.contains(OutputModes::OPOST) {
        output.insert(OutputFlags::OPOST);
    }
    if t.output_modes.contains(OutputModes::ONLCR) {
        output.insert(OutputFlags::ONLCR);
    }
    if t.output_modes.contains(OutputModes::OCRNL) {
        output.insert(OutputFlags::OCRNL);
    }
    if t.output_modes.contains(OutputModes::ONOCR) {
        output.insert(OutputFlags::ONOCR);
    }
    if t.output_modes.contains(OutputModes::ONLRET) {
        output.insert(OutputFlags::ONLRET);
    }

    let mut control = ControlFlags::empty();
    if t.control_modes.contains(rustix::termios::ControlModes::CS8) {
        control.insert(ControlFlags::CS8);
    } else if t.control_modes.contains(rustix::termios::ControlModes::CS7) {
        control.insert(ControlFlags::CS7);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::CSTOPB) {
        control.insert(ControlFlags::CSTOPB);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::CREAD) {
        control.insert(ControlFlags::CREAD);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::PARENB) {
        control.insert(ControlFlags::PARENB);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::PARODD) {
        control.insert(ControlFlags::PARODD);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::HUPCL) {
        control.insert(ControlFlags::HUPCL);
    }
    if t.control_modes.contains(rustix::termios::ControlModes::CLOCAL) {
        control.insert(ControlFlags::CLOCAL);
    }

    let mut local = LocalFlags::empty();
    if t.local_modes.contains(LocalModes::ISIG) {
        local.insert(LocalFlags::ISIG);
    }
    if t.local_modes.contains(LocalModes::ICANON) {
        local.insert(LocalFlags::ICANON);
    }
    if t.local_modes.contains(LocalModes::ECHO) {
        local.insert(LocalFlags::ECHO);
    }
    if t.local_modes.contains(LocalModes::ECHOE) {
        local.insert(LocalFlags::ECHOE);
    }
    if t.local_modes.contains(LocalModes::ECHOK) {
        local.insert(LocalFlags::ECHOK);
    }
    if t.local_modes.contains(LocalModes::ECHONL) {
        local.insert(LocalFlags::ECHONL);
    }
    if t.local_modes.contains(LocalModes::NOFLSH) {
        local.insert(LocalFlags::NOFLSH);
    }
    if t.local_modes.contains(LocalModes::TOSTOP) {
        local.insert(LocalFlags::TOSTOP);
    }
    if t.local_modes.contains(LocalModes::IEXTEN) {
        local.insert(LocalFlags::IEXTEN);
    }
    if t.local_modes.contains(LocalModes::PENDIN) {
        local.insert(LocalFlags::PENDIN);
    }

    let mut control_chars = std::collections::HashMap::new();
    control_chars.insert(ControlChar::VMin, t.special_codes[SpecialCodeIndex::VMIN]);
    control_chars.insert(ControlChar::VTime, t.special_codes[SpecialCodeIndex::VTIME]);
    control_chars.insert(ControlChar::VIntr, t.special_codes[SpecialCodeIndex::VINTR]);
    control_chars.insert(ControlChar::VQuit, t.special_codes[SpecialCodeIndex::VQUIT]);
    control_chars.insert(ControlChar::VErase, t.special_codes[SpecialCodeIndex::VERASE]);
    control_chars.insert(ControlChar::VKill, t.special_codes[SpecialCodeIndex::VKILL]);
    control_chars.insert(ControlChar::VEof, t.special_codes[SpecialCodeIndex::VEOF]);
    control_chars.insert(ControlChar::VStart, t.special_codes[SpecialCodeIndex::VSTART]);
    control_chars.insert(ControlChar::VStop, t.special_codes[SpecialCodeIndex::VSTOP]);
    control_chars.insert(ControlChar::VSusp, t.special_codes[SpecialCodeIndex::VSUSP]);
    control_chars.insert(ControlChar::VReprint, t.special_codes[SpecialCodeIndex::VREPRINT]);
    control_chars.insert(ControlChar::VWerase, t.special_codes[SpecialCodeIndex::VWERASE]);
    control_chars.insert(ControlChar::VLnext, t.special_codes[SpecialCodeIndex::VLNEXT]);
    control_chars.insert(ControlChar::VDiscard, t.special_codes[SpecialCodeIndex::VDISCARD]);

    Attributes { input, output, control, local, control_chars }
}

#[derive(Debug)]
struct PosixReader {
    fd: OwnedFd,
}

impl PosixReader {
    fn poll_readable(&self, timeout: Option<Duration>) -> Result<bool> {
        let mut poll = mio::Poll::new().map_err(TermError::from)?;
        let mut events = mio::Events::with_capacity(1);
        let raw = self.fd.as_raw_fd();
        let mut source = mio::unix::SourceFd(&raw);
        poll.registry()
            .register(&mut source, mio::Token(0), mio::Interest::READABLE)
            .map_err(TermError::from)?;
        poll.poll(&mut events, timeout).map_err(TermError::from)?;
        Ok(!events.is_empty())
    }
}

impl Reader for PosixReader {
    fn peek(&mut self) -> Result<Option<u8>> {
        if !self.poll_readable(Some(Duration::ZERO))? {
            return Ok(None);
        }
        // A true peek would require a kernel-level MSG_PEEK-equivalent for
        // ttys, which doesn't exist; readability implies at least one byte
        // is ready, so report that without consuming it is not possible
        // for a raw fd. Callers that need peek semantics use the binding
        // reader's own one-byte pushback buffer instead.
        Ok(Some(0))
    }

    fn read(&mut self) -> Result<u8> {
        self.poll_readable(None)?;
        let mut buf = [0u8; 1];
        rustix::io::read(&self.fd, &mut buf).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        Ok(buf[0])
    }

    fn read_timeout(&mut self, timeout: Duration) -> Result<Option<u8>> {
        if !self.poll_readable(Some(timeout))? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        let n = rustix::io::read(&self.fd, &mut buf).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf[0]))
    }

    fn clear(&mut self) -> Result<()> {
        while self.poll_readable(Some(Duration::ZERO))? {
            let mut buf = [0u8; 256];
            if rustix::io::read(&self.fd, &mut buf).map_err(|e| TermError::Io { source: io::Error::from(e) })? == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PosixWriter {
    fd: OwnedFd,
    buffer: Vec<u8>,
}

impl Writer for PosixWriter {
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
        rustix::io::write(&self.fd, &self.buffer).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        self.buffer.clear();
        Ok(())
    }
}

/// `spec.md` §4.3's "POSIX system terminal" variant.
#[derive(Debug)]
pub struct PosixTerminal {
    reader: PosixReader,
    writer: PosixWriter,
    snapshot: Option<termios::Termios>,
    signals: Arc<SignalRegistry>,
    tokens: Vec<SignalToken>,
    depth: ColorDepth,
    closed: bool,
}

impl PosixTerminal {
    /// Opens the controlling tty (`/dev/tty`) for both reading and
    /// writing.
    ///
    /// # Errors
    /// Returns [`TermError::NotATerminal`] if the process has no
    /// controlling tty.
    pub fn open() -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|_| TermError::NotATerminal)?;
        let read_file = file.try_clone().map_err(TermError::from)?;
        let read_fd: OwnedFd = read_file.into();
        let fd: OwnedFd = file.into();

        let signals = Arc::new(SignalRegistry::new());
        let tokens = register_default_signal_tokens(&signals);

        Ok(PosixTerminal {
            reader: PosixReader { fd: read_fd },
            writer: PosixWriter { fd, buffer: Vec::new() },
            snapshot: None,
            signals,
            tokens,
            depth: ColorDepth::Ansi256,
            closed: false,
        })
    }

    fn borrowed(&self) -> BorrowedFd<'_> { self.reader.fd.as_fd() }
}

impl Terminal for PosixTerminal {
    fn reader(&mut self) -> &mut dyn Reader { &mut self.reader }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.writer }

    fn get_attributes(&self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let t = termios::tcgetattr(self.borrowed()).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        Ok(from_rustix(&t))
    }

    fn set_attributes(&mut self, attrs: Attributes) -> Result<()> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let mut t = termios::tcgetattr(self.borrowed()).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        apply_attrs(&mut t, &attrs);
        termios::tcsetattr(self.borrowed(), OptionalActions::Now, &t)
            .map_err(|e| TermError::Io { source: io::Error::from(e) })
    }

    fn get_size(&self) -> Result<Size> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let ws = rustix::termios::tcgetwinsize(self.borrowed()).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        Ok(Size::new(ws.ws_row, ws.ws_col))
    }

    fn set_size(&mut self, _size: Size) -> Result<()> {
        Err(TermError::UnsupportedOperation("resizing the physical system terminal device"))
    }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.signals.install(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> {
        if self.closed {
            return Err(TermError::Closed);
        }
        let current = termios::tcgetattr(self.borrowed()).map_err(|e| TermError::Io { source: io::Error::from(e) })?;
        if self.snapshot.is_none() {
            self.snapshot = Some(current.clone());
        }
        let snapshot_attrs = from_rustix(&current);

        let mut raw = current;
        raw.input_modes.remove(
            InputModes::IGNBRK
                | InputModes::BRKINT
                | InputModes::PARMRK
                | InputModes::ISTRIP
                | InputModes::INLCR
                | InputModes::IGNCR
                | InputModes::ICRNL
                | InputModes::IXON,
        );
        raw.output_modes.remove(OutputModes::OPOST);
        raw.local_modes.remove(
            LocalModes::ECHO | LocalModes::ECHONL | LocalModes::ICANON | LocalModes::ISIG | LocalModes::IEXTEN,
        );
        raw.control_modes.remove(rustix::termios::ControlModes::CSIZE | rustix::termios::ControlModes::PARENB);
        raw.control_modes.insert(rustix::termios::ControlModes::CS8);
        raw.special_codes[SpecialCodeIndex::VMIN] = 1;
        raw.special_codes[SpecialCodeIndex::VTIME] = 0;

        termios::tcsetattr(self.borrowed(), OptionalActions::Now, &raw)
            .map_err(|e| TermError::Io { source: io::Error::from(e) })?;

        Ok(snapshot_attrs)
    }

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
        if let Some(snapshot) = self.snapshot.take() {
            if let Err(e) = termios::tcsetattr(self.borrowed(), OptionalActions::Now, &snapshot) {
                warn!(error = %e, "failed to restore terminal attributes on close");
            }
        }
        while self.tokens.pop().is_some() {}
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { self.depth }
}
