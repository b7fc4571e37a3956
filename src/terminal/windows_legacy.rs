// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Windows legacy console: output is routed through
//! [`crate::win32::ansi_translator::AnsiTranslator`] instead of being
//! written straight through, for hosts without
//! `ENABLE_VIRTUAL_TERMINAL_PROCESSING` support (pre-Windows-10 consoles,
//! or consoles where enabling VT mode failed). Input decoding is identical
//! to [`crate::terminal::windows_vt::WindowsVtTerminal`].

#![cfg(windows)]

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use windows_sys::Win32::System::Console::{GetConsoleMode, GetStdHandle, SetConsoleMode, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE};

use crate::error::{Result, TermError};
use crate::platform::windows::{self, PumpEvent};
use crate::style::ColorDepth;
use crate::terminal::attributes::Attributes;
use crate::terminal::line_discipline::LineDisciplineTerminal;
use crate::terminal::signal::{Handler, Signal};
use crate::terminal::size::Size;
use crate::terminal::traits::{MouseTracking, Reader, Terminal, Writer};
use crate::win32::ansi_translator::AnsiTranslator;
use crate::win32::console_api::ConsoleHandle;

struct TranslatedOut(AnsiTranslator);

impl std::fmt::Debug for TranslatedOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("TranslatedOut").finish() }
}

impl Writer for TranslatedOut {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.feed(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// `spec.md` §4.3's "Windows legacy console" variant.
#[derive(Debug)]
pub struct WindowsLegacyTerminal {
    line_discipline: LineDisciplineTerminal,
    writer: TranslatedOut,
    pump: Option<JoinHandle<()>>,
    pump_rx: Option<Receiver<PumpEvent>>,
    paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    original_in_mode: u32,
    closed: bool,
}

impl WindowsLegacyTerminal {
    /// Opens the legacy console without attempting to enable VT processing.
    ///
    /// # Errors
    /// Returns [`TermError::NotATerminal`] if the process has no console,
    /// or [`TermError::Io`] if the console buffer query fails.
    pub fn open() -> Result<Self> {
        let stdout = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        if stdout.is_null() || stdin.is_null() {
            return Err(TermError::NotATerminal);
        }

        let console = ConsoleHandle(stdout);
        let info = console.screen_buffer_info()?;
        let original_attrs = info.wAttributes;

        let size = Size::new(
            (info.srWindow.Bottom - info.srWindow.Top + 1).max(1) as u16,
            (info.srWindow.Right - info.srWindow.Left + 1).max(1) as u16,
        );

        let mut original_in_mode = 0u32;
        unsafe { GetConsoleMode(stdin, &mut original_in_mode) };

        let paused = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let (pump, pump_rx) = windows::spawn(stdin, Arc::clone(&paused), Arc::clone(&stop));

        Ok(WindowsLegacyTerminal {
            line_discipline: LineDisciplineTerminal::new(Attributes::cooked(), size),
            writer: TranslatedOut(AnsiTranslator::new(console, original_attrs)),
            pump: Some(pump),
            pump_rx: Some(pump_rx),
            paused,
            stop,
            original_in_mode,
            closed: false,
        })
    }

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

impl Terminal for WindowsLegacyTerminal {
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

    fn set_mouse_tracking(&mut self, _mode: MouseTracking) -> Result<()> {
        // The legacy console has no native mouse-tracking escape sequences;
        // mouse events still arrive as `INPUT_RECORD`s through the input
        // pump regardless of this setting.
        Ok(())
    }

    fn set_focus_tracking(&mut self, _enabled: bool) -> Result<()> { Ok(()) }

    fn set_bracketed_paste(&mut self, _enabled: bool) -> Result<()> { Ok(()) }

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
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        unsafe { SetConsoleMode(stdin, self.original_in_mode) };
        let _ = std::io::stdout().flush();
        self.closed = true;
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth { ColorDepth::Ansi16 }
}
