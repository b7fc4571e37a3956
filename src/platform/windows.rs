// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The dedicated Windows console input pump (`spec.md` §4.4/§5): drains
//! `INPUT_RECORD`s off the console input buffer on its own thread and
//! decodes them into the byte stream a VT terminal would have produced,
//! so [`crate::terminal::windows_vt::WindowsVtTerminal`] and
//! [`crate::terminal::windows_legacy::WindowsLegacyTerminal`] can feed a
//! [`crate::terminal::line_discipline::LineDisciplineTerminal`] the same
//! way a piped POSIX child's stdout would.
//!
//! No sibling module here drives a Win32 input pump; built per `spec.md` §5's
//! "dedicated input pump thread" description, using the same polling shape
//! (`WaitForSingleObject` with a short timeout, rather than an indefinite
//! blocking read) that keeps a console-glue pump thread responsive to
//! shutdown.

#![cfg(windows)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use windows_sys::Win32::Foundation::{HANDLE, WAIT_OBJECT_0};
use windows_sys::Win32::System::Console::{
    ReadConsoleInputW, FOCUS_EVENT, INPUT_RECORD, KEY_EVENT, MENU_EVENT, MOUSE_EVENT,
    WINDOW_BUFFER_SIZE_EVENT,
};
use windows_sys::Win32::System::Threading::WaitForSingleObject;

use crate::terminal::size::Size;
use crate::win32::input_decoder::{decode_key_down, encode_mouse_event, Modifiers};

/// How long the pump waits on the console input handle before re-checking
/// `stop`/`paused`, shared with the terminal variants that spawn it.
pub const POLL_INTERVAL: Duration = Duration::from_millis(15);

/// One decoded batch the pump hands back to the owning terminal.
#[derive(Debug, Clone)]
pub enum PumpEvent {
    /// Bytes to feed into the line-discipline emulator, in arrival order.
    Bytes(Vec<u8>),
    /// The console buffer was resized.
    Resize(Size),
}

/// Spawns the pump thread, returning its join handle and the receiving end
/// of the channel it posts [`PumpEvent`]s to. `stop` is checked once per
/// poll interval; setting it unblocks and joins the thread promptly rather
/// than leaving it parked in a blocking read.
#[must_use]
pub fn spawn(stdin: HANDLE, paused: Arc<AtomicBool>, stop: Arc<AtomicBool>) -> (JoinHandle<()>, Receiver<PumpEvent>) {
    let (tx, rx) = channel();
    let handle = std::thread::spawn(move || pump_loop(stdin, &paused, &stop, &tx));
    (handle, rx)
}

fn pump_loop(stdin: HANDLE, paused: &AtomicBool, stop: &AtomicBool, tx: &Sender<PumpEvent>) {
    while !stop.load(Ordering::SeqCst) {
        if paused.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let wait = unsafe { WaitForSingleObject(stdin, POLL_INTERVAL.as_millis() as u32) };
        if wait != WAIT_OBJECT_0 {
            continue;
        }

        let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
        let mut read = 0u32;
        let ok = unsafe { ReadConsoleInputW(stdin, &mut record, 1, &mut read) };
        if ok == 0 || read == 0 {
            continue;
        }

        if let Some(event) = decode_record(&record) {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

fn decode_record(record: &INPUT_RECORD) -> Option<PumpEvent> {
    // SAFETY: `EventType` tags which union field is initialized; each arm
    // below reads only the field its tag promises is live.
    unsafe {
        match record.EventType as u32 {
            KEY_EVENT => {
                let key = &record.Event.KeyEvent;
                if key.bKeyDown == 0 {
                    return None;
                }
                let modifiers = Modifiers::from_control_key_state(key.dwControlKeyState);
                let decoded = decode_key_down(key.wVirtualKeyCode, key.uChar.UnicodeChar, modifiers, key.wRepeatCount);
                if decoded.bytes.is_empty() {
                    None
                } else {
                    Some(PumpEvent::Bytes(decoded.bytes))
                }
            }
            MOUSE_EVENT => {
                let mouse = &record.Event.MouseEvent;
                let button = mouse_button_code(mouse.dwButtonState, mouse.dwEventFlags);
                let bytes = encode_mouse_event(button, mouse.dwMousePosition.X as u16, mouse.dwMousePosition.Y as u16, true);
                Some(PumpEvent::Bytes(bytes))
            }
            WINDOW_BUFFER_SIZE_EVENT => {
                let size = &record.Event.WindowBufferSizeEvent;
                Some(PumpEvent::Resize(Size::new(size.dwSize.Y.max(1) as u16, size.dwSize.X.max(1) as u16)))
            }
            FOCUS_EVENT | MENU_EVENT => None,
            _ => None,
        }
    }
}

fn mouse_button_code(button_state: u32, event_flags: u32) -> u8 {
    const MOUSE_WHEELED: u32 = 0x0004;
    const FROM_LEFT_1ST_BUTTON_PRESSED: u32 = 0x0001;
    const RIGHTMOST_BUTTON_PRESSED: u32 = 0x0002;

    if event_flags & MOUSE_WHEELED != 0 {
        return if (button_state as i32) < 0 { 0x41 } else { 0x40 };
    }
    if button_state & FROM_LEFT_1ST_BUTTON_PRESSED != 0 {
        0
    } else if button_state & RIGHTMOST_BUTTON_PRESSED != 0 {
        2
    } else {
        3
    }
}
