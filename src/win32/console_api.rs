// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Thin, owned wrapper over the Win32 console functions this crate needs.
//!
//! Grounded in `spec.md` §9's "global static console handles -> model as
//! per-terminal owned handles; no process-wide mutable state" design note:
//! every function here takes a handle value rather than reaching for a
//! process-wide `GetStdHandle` cache.

#![cfg(windows)]

use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::Console::{
    FillConsoleOutputAttribute, FillConsoleOutputCharacterW, GetConsoleScreenBufferInfo,
    ScrollConsoleScreenBufferW, SetConsoleCursorPosition, SetConsoleTextAttribute, SetConsoleTitleW,
    WriteConsoleW, CHAR_INFO, CONSOLE_SCREEN_BUFFER_INFO, COORD, SMALL_RECT,
};

use crate::error::{Result, TermError};

/// The 16 legacy-console attribute bits this crate manipulates (foreground
/// nibble in the low 4 bits, background nibble in bits 4-7).
pub type ConsoleAttributes = u16;

#[derive(Debug, Clone, Copy)]
pub struct ConsoleHandle(pub HANDLE);

// SAFETY: a Win32 `HANDLE` is an opaque numeric value; sending it across
// threads is sound as long as the underlying object supports concurrent
// use, which `STD_OUTPUT_HANDLE` does for the operations used here.
unsafe impl Send for ConsoleHandle {}
unsafe impl Sync for ConsoleHandle {}

impl ConsoleHandle {
    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn screen_buffer_info(&self) -> Result<CONSOLE_SCREEN_BUFFER_INFO> {
        let mut info = unsafe { std::mem::zeroed::<CONSOLE_SCREEN_BUFFER_INFO>() };
        let ok = unsafe { GetConsoleScreenBufferInfo(self.0, &mut info) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(info)
    }

    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn set_text_attribute(&self, attrs: ConsoleAttributes) -> Result<()> {
        let ok = unsafe { SetConsoleTextAttribute(self.0, attrs) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn set_cursor_position(&self, row: i16, col: i16) -> Result<()> {
        let coord = COORD { X: col, Y: row };
        let ok = unsafe { SetConsoleCursorPosition(self.0, coord) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn write_text(&self, text: &str) -> Result<()> {
        let utf16: Vec<u16> = text.encode_utf16().collect();
        let mut written = 0u32;
        let ok = unsafe {
            WriteConsoleW(self.0, utf16.as_ptr().cast(), utf16.len() as u32, &mut written, std::ptr::null_mut())
        };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(())
    }

    /// Fills `count` cells starting at `(row, col)` with `ch`, returning
    /// the number of cells actually written.
    ///
    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn fill_character(&self, ch: u16, count: u32, row: i16, col: i16) -> Result<u32> {
        let mut written = 0u32;
        let ok = unsafe { FillConsoleOutputCharacterW(self.0, ch, count, COORD { X: col, Y: row }, &mut written) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(written)
    }

    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn fill_attribute(&self, attrs: ConsoleAttributes, count: u32, row: i16, col: i16) -> Result<u32> {
        let mut written = 0u32;
        let ok = unsafe { FillConsoleOutputAttribute(self.0, attrs, count, COORD { X: col, Y: row }, &mut written) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(written)
    }

    /// Scrolls `scroll_rect` by `(dx, dy)` cells, filling the vacated area
    /// with `fill`.
    ///
    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn scroll(&self, scroll_rect: SMALL_RECT, dx: i16, dy: i16, fill: CHAR_INFO) -> Result<()> {
        let destination = COORD { X: scroll_rect.Left + dx, Y: scroll_rect.Top + dy };
        let ok = unsafe {
            ScrollConsoleScreenBufferW(self.0, &scroll_rect, std::ptr::null(), destination, &fill)
        };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`TermError::Io`] if the API call fails.
    pub fn set_title(&self, title: &str) -> Result<()> {
        let mut utf16: Vec<u16> = title.encode_utf16().collect();
        utf16.push(0);
        let ok = unsafe { SetConsoleTitleW(utf16.as_ptr()) };
        if ok == 0 {
            return Err(TermError::Io { source: std::io::Error::last_os_error() });
        }
        Ok(())
    }
}
