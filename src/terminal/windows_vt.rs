// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Windows VT-capable console: enables
//! `ENABLE_VIRTUAL_TERMINAL_PROCESSING` and writes ANSI straight through.
//! Input comes from a dedicated pump thread decoding `INPUT_RECORD`s (see
//! [`crate::win32::input_decoder`]) into a
//! [`crate::terminal::line_discipline::LineDisciplineTerminal`], per
//! `spec.md` §4.3/§5's "dedicated input pump thread" model.

#![cfg(windows)]

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, SetConsoleMode, ENABLE_PROCESSED_OUTPUT,
    ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use crate::error::{Result, TermError};
use crate::platform::windows::{self, PumpEvent};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::line_discipline::LineDisciplineTerminal;
use crate::terminal::signal::{Handler, Signal};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};
use crate::win32::console_api::ConsoleHandle;

pub use windows::POLL_INTERVAL as PUMP_POLL_INTERVAL;

struct ConsoleOut(ConsoleHandle);

impl std::fmt::Debug for ConsoleOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("ConsoleOut").finish() }
}

impl Writer for ConsoleOut {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.0.write_text(&text)
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// `spec.md` §4.3's "Windows VT-capable console" variant.
#[derive(Debug)]
pub struct WindowsVtTerminal {
    line_discipline: LineDisciplineTerminal,
    writer: ConsoleOut,
    pump: Option<JoinHandle<()>>,
    pump_rx: Option<Receiver<PumpEvent>>,
    paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    original_in_mode: u32,
    original_out_mode: u32,
    closed: bool,
}

impl WindowsVtTerminal {
    /// Enables VT processing on stdout and spawns the input pump thread.
    ///
    /// # Errors
    /// Returns [`TermError::NotATerminal`] if the process has no console,
    /// or [`TermError::Io`] if the mode-setting calls fail.
    pub fn open() -> Result<Self> {
        let stdout = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        if stdout.is_null() || stdin.is_null() {
            return Err(TermError::NotATerminal);
        }

        let mut original_out_mode = 0u32;
        if unsafe { GetConsoleMode(stdout, &mut original_out_mode) } == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        let vt_mode = original_out_mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING | ENABLE_PROCESSED_OUTPUT;
        if unsafe { SetConsoleMode(stdout, vt_mode) } == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }

        let mut original_in_mode = 0u32;
        unsafe { GetConsoleMode(stdin, &mut original_in_mode) };

        let line_discipline = LineDisciplineTerminal::new(Attributes::cooked(), query_buffer_size(stdout));
        let paused = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let (pump, pump_rx) = windows::spawn(stdin, Arc::clone(&paused), Arc::clone(&stop));

        Ok(WindowsVtTerminal {
            line_discipline,
            writer: ConsoleOut(ConsoleHandle(stdout)),
            pump: Some(pump),
            pump_rx: Some(pump_rx),
            paused,
            stop,
            original_in_mode,
            original_out_mode,
            closed: false,
        })
    }

    /// Drains any [`PumpEvent`]s the input-pump thread has posted since the
    /// last drain, feeding decoded bytes into the line-discipline emulator
    /// and applying buffer resizes. Never blocks.
    fn drain_pump(&mut self) {
        let Some(rx) = self.pump_rx.as_ref() else { return };
        while let Ok(event) = rx.try_recv() {
            match event {
                PumpEvent::Bytes(bytes) => {
                    for byte in bytes {
                        self.line_discipline.feed_master_byte(byte);
                    }
                }
                PumpEvent::Resize(size) => {
                    let _ = self.line_discipline.set_size(size);
                }
            }
        }
    }
}

fn query_buffer_size(stdout: HANDLE) -> Size {
    ConsoleHandle(stdout)
        .screen_buffer_info()
        .map(|info| Size::new(
            (info.srWindow.Bottom - info.srWindow.Top + 1).max(1) as u16,
            (info.srWindow.Right - info.srWindow.Left + 1).max(1) as u16,
        ))
        .unwrap_or_default()
}

impl Terminal for WindowsVtTerminal {
    fn reader(&mut self) -> &mut dyn Reader {
        self.drain_pump();
        self.line_discipline.reader()
    }

    fn writer(&mut self) -> &mut dyn Writer { &mut self.writer }

    fn get_attributes(&self) -> Result<Attributes> { self.line_discipline.get_attributes() }

    fn set_attributes(&mut self, attrs: Attributes) -> Result<()> { self.line_discipline.set_attributes(attrs) }

    fn get_size(&self) -> Result<Size> { self.line_discipline.get_size() }

    fn set_size(&mut self, size: Size) -> Result<()> { self.line_discipline.set_size(size) }

    fn handle(&self, signal: Signal, handler: Handler) -> Handler { self.line_discipline.handle(signal, handler) }

    fn enter_raw_mode(&mut self) -> Result<Attributes> { self.line_discipline.enter_raw_mode() }

    fn set_mouse_tracking(&mut self, mode: MouseTracking) -> Result<()> {
        let seq: &[u8] = match mode {
            MouseTracking::Off => b"\x1b[?1000l\x1b[?1002l\x1b[?1003l",
            MouseTracking::Normal => b"\x1b[?1000h",
            MouseTracking::Button => b"\x1b[?1002h",
            MouseTracking::Any => b"\x1b[?1003h",
        };
        self.writer.write(seq)
    }

    fn set_focus_tracking(&mut self, enabled: bool) -> Result<()> {
        self.writer.write(if enabled { b"\x1b[?1004h" } else { b"\x1b[?1004l" })
    }

    fn set_bracketed_paste(&mut self, enabled: bool) -> Result<()> {
        self.writer.write(if enabled { b"\x1b[?2004h" } else { b"\x1b[?2004l" })
    }

    fn pause(&mut self) -> Result<()> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.pump.take() {
            let _ = handle.join();
        }
        self.pump_rx = None;
        let stdout = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        unsafe {
            SetConsoleMode(stdout, self.original_out_mode);
            SetConsoleMode(stdin, self.original_in_mode);
        }
        let _ = std::io::stdout().flush();
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { ColorDepth::TrueColor }
}
