// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! On consoles lacking `ENABLE_VIRTUAL_TERMINAL_PROCESSING`, parses ANSI
//! CSI/OSC/SGR sequences incrementally and invokes native console
//! functions that realize the same visual effect.
//!
//! Mirrors
//! `core/pty_mux/ansi_parser::AnsiToOfsBufPerformer`: a `vte::Perform`
//! implementation routing CSI finals to small per-concern handler
//! functions (cursor, erase, scroll, SGR), rather than one large match
//! arm. Unlike that prior art (which targets an in-memory offscreen buffer),
//! `print`/`execute`/`csi_dispatch` here call straight through to
//! [`crate::win32::console_api::ConsoleHandle`].

#![cfg(windows)]

use vte::{Params, Parser, Perform};
use windows_sys::Win32::System::Console::{CHAR_INFO, CHAR_INFO_0, SMALL_RECT};

use crate::style::color::{Ansi16, Rgb, TransformColor};
use crate::win32::console_api::ConsoleHandle;

const FG_BLUE: u16 = 0x0001;
const FG_GREEN: u16 = 0x0002;
const FG_RED: u16 = 0x0004;
const FG_INTENSITY: u16 = 0x0008;
const BG_BLUE: u16 = 0x0010;
const BG_GREEN: u16 = 0x0020;
const BG_RED: u16 = 0x0040;
const BG_INTENSITY: u16 = 0x0080;

fn ansi16_fg_bits(idx: Ansi16) -> u16 {
    let bits = match idx {
        Ansi16::Black => 0,
        Ansi16::Red => FG_RED,
        Ansi16::Green => FG_GREEN,
        Ansi16::Yellow => FG_RED | FG_GREEN,
        Ansi16::Blue => FG_BLUE,
        Ansi16::Magenta => FG_RED | FG_BLUE,
        Ansi16::Cyan => FG_GREEN | FG_BLUE,
        Ansi16::White => FG_RED | FG_GREEN | FG_BLUE,
        Ansi16::BrightBlack => FG_INTENSITY,
        Ansi16::BrightRed => FG_RED | FG_INTENSITY,
        Ansi16::BrightGreen => FG_GREEN | FG_INTENSITY,
        Ansi16::BrightYellow => FG_RED | FG_GREEN | FG_INTENSITY,
        Ansi16::BrightBlue => FG_BLUE | FG_INTENSITY,
        Ansi16::BrightMagenta => FG_RED | FG_BLUE | FG_INTENSITY,
        Ansi16::BrightCyan => FG_GREEN | FG_BLUE | FG_INTENSITY,
        Ansi16::BrightWhite => FG_RED | FG_GREEN | FG_BLUE | FG_INTENSITY,
    };
    bits
}

fn ansi16_bg_bits(idx: Ansi16) -> u16 { ansi16_fg_bits(idx) << 4 }

/// Owns the `vte` state machine and the accumulated attribute state for
/// one console output stream.
pub struct AnsiTranslator {
    parser: Parser,
    performer: TranslatorPerformer,
}

impl AnsiTranslator {
    #[must_use]
    pub fn new(console: ConsoleHandle, original_attrs: u16) -> Self {
        AnsiTranslator {
            parser: Parser::new(),
            performer: TranslatorPerformer::new(console, original_attrs),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.parser.advance(&mut self.performer, byte);
        }
    }
}

struct TranslatorPerformer {
    console: ConsoleHandle,
    original_attrs: u16,
    fg: Ansi16,
    bg: Ansi16,
    bold: bool,
    negative: bool,
    cursor_row: i16,
    cursor_col: i16,
    saved_cursor: Option<(i16, i16)>,
}

impl TranslatorPerformer {
    fn new(console: ConsoleHandle, original_attrs: u16) -> Self {
        TranslatorPerformer {
            console,
            original_attrs,
            fg: Ansi16::White,
            bg: Ansi16::Black,
            bold: false,
            negative: false,
            cursor_row: 0,
            cursor_col: 0,
            saved_cursor: None,
        }
    }

    /// Recomputes the 16-bit Win32 attribute word from `fg`/`bg`, applies
    /// `negative` (swap nibbles) then `bold` (fg intensity), per
    /// `spec.md` §4.5 "Color model details".
    fn apply_attributes(&self) {
        let mut word = ansi16_fg_bits(self.fg) | ansi16_bg_bits(self.bg);
        if self.negative {
            let fg_nibble = word & 0x000F;
            let bg_nibble = (word & 0x00F0) >> 4;
            word = bg_nibble | (fg_nibble << 4);
        }
        if self.bold {
            word |= FG_INTENSITY;
        }
        let _ = self.console.set_text_attribute(word);
    }

    fn reset_attributes(&mut self) {
        self.fg = Ansi16::White;
        self.bg = Ansi16::Black;
        self.bold = false;
        self.negative = false;
        let _ = self.console.set_text_attribute(self.original_attrs);
    }

    fn move_cursor(&mut self, row: i16, col: i16) {
        self.cursor_row = row.max(0);
        self.cursor_col = col.max(0);
        let _ = self.console.set_cursor_position(self.cursor_row, self.cursor_col);
    }

    fn param(params: &Params, index: usize, default: i64) -> i64 {
        params.iter().nth(index).and_then(|p| p.first().copied()).map_or(default, i64::from)
    }

    fn dispatch_sgr(&mut self, params: &Params) {
        let values: Vec<i64> = params.iter().map(|p| i64::from(p.first().copied().unwrap_or(0))).collect();
        if values.is_empty() || values == [0] {
            self.reset_attributes();
            self.apply_attributes();
            return;
        }

        let mut i = 0;
        while i < values.len() {
            match values[i] {
                0 => self.reset_attributes(),
                1 => self.bold = true,
                7 => self.negative = true,
                27 => self.negative = false,
                22 => self.bold = false,
                30..=37 => self.fg = index_to_ansi16((values[i] - 30) as u8, self.bold),
                90..=97 => self.fg = index_to_ansi16((values[i] - 90) as u8, true),
                40..=47 => self.bg = index_to_ansi16((values[i] - 40) as u8, false),
                100..=107 => self.bg = index_to_ansi16((values[i] - 100) as u8, true),
                38 | 48 => {
                    let is_bg = values[i] == 48;
                    if values.get(i + 1) == Some(&5) {
                        if let Some(&idx) = values.get(i + 2) {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            let ansi16 = crate::style::color::Ansi256(idx as u8).as_ansi16();
                            if is_bg { self.bg = ansi16; } else { self.fg = ansi16; }
                            i += 2;
                        }
                    } else if values.get(i + 1) == Some(&2) {
                        if let (Some(&r), Some(&g), Some(&b)) = (values.get(i + 2), values.get(i + 3), values.get(i + 4)) {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            let ansi16 = Rgb::new(r as u8, g as u8, b as u8).as_ansi16();
                            if is_bg { self.bg = ansi16; } else { self.fg = ansi16; }
                            i += 4;
                        }
                    }
                }
                // Italic (3), blink (5), conceal (8): no legacy-console
                // equivalent exists; ignored per spec.md §4.5. Underline
                // (4) maps to background intensity, the closest visual
                // analogue a 16-color console offers.
                4 => self.bg = bg_with_intensity(self.bg),
                _ => {}
            }
            i += 1;
        }
        self.apply_attributes();
    }
}

fn bg_with_intensity(bg: Ansi16) -> Ansi16 {
    // Best-effort: promote a normal background color to its bright
    // counterpart to emulate an underline as "highlighted background".
    match bg {
        Ansi16::Black => Ansi16::BrightBlack,
        Ansi16::Red => Ansi16::BrightRed,
        Ansi16::Green => Ansi16::BrightGreen,
        Ansi16::Yellow => Ansi16::BrightYellow,
        Ansi16::Blue => Ansi16::BrightBlue,
        Ansi16::Magenta => Ansi16::BrightMagenta,
        Ansi16::Cyan => Ansi16::BrightCyan,
        other => other,
    }
}

fn index_to_ansi16(idx: u8, bright: bool) -> Ansi16 {
    match (idx, bright) {
        (0, false) => Ansi16::Black,
        (1, false) => Ansi16::Red,
        (2, false) => Ansi16::Green,
        (3, false) => Ansi16::Yellow,
        (4, false) => Ansi16::Blue,
        (5, false) => Ansi16::Magenta,
        (6, false) => Ansi16::Cyan,
        (7, false) => Ansi16::White,
        (0, true) => Ansi16::BrightBlack,
        (1, true) => Ansi16::BrightRed,
        (2, true) => Ansi16::BrightGreen,
        (3, true) => Ansi16::BrightYellow,
        (4, true) => Ansi16::BrightBlue,
        (5, true) => Ansi16::BrightMagenta,
        (6, true) => Ansi16::BrightCyan,
        _ => Ansi16::BrightWhite,
    }
}

impl Perform for TranslatorPerformer {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let _ = self.console.write_text(c.encode_utf8(&mut buf));
        self.cursor_col += 1;
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.move_cursor(self.cursor_row + 1, 0),
            b'\r' => self.move_cursor(self.cursor_row, 0),
            0x08 => self.move_cursor(self.cursor_row, (self.cursor_col - 1).max(0)),
            b'\t' => {
                let next = (self.cursor_col / 8 + 1) * 8;
                self.move_cursor(self.cursor_row, next);
            }
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, action: char) {
        match action {
            'A' => self.move_cursor(self.cursor_row - Self::param(params, 0, 1) as i16, self.cursor_col),
            'B' => self.move_cursor(self.cursor_row + Self::param(params, 0, 1) as i16, self.cursor_col),
            'C' => self.move_cursor(self.cursor_row, self.cursor_col + Self::param(params, 0, 1) as i16),
            'D' => self.move_cursor(self.cursor_row, self.cursor_col - Self::param(params, 0, 1) as i16),
            'E' => self.move_cursor(self.cursor_row + Self::param(params, 0, 1) as i16, 0),
            'F' => self.move_cursor(self.cursor_row - Self::param(params, 0, 1) as i16, 0),
            'G' => self.move_cursor(self.cursor_row, Self::param(params, 0, 1) as i16 - 1),
            'H' | 'f' => {
                let row = Self::param(params, 0, 1) as i16 - 1;
                let col = Self::param(params, 1, 1) as i16 - 1;
                self.move_cursor(row, col);
            }
            'J' => self.erase_display(Self::param(params, 0, 0)),
            'K' => self.erase_line(Self::param(params, 0, 0)),
            's' => self.saved_cursor = Some((self.cursor_row, self.cursor_col)),
            'u' => {
                if let Some((row, col)) = self.saved_cursor {
                    self.move_cursor(row, col);
                }
            }
            'm' => self.dispatch_sgr(params),
            #[allow(clippy::cast_possible_truncation)]
            'S' => self.scroll_up(Self::param(params, 0, 1) as i16),
            #[allow(clippy::cast_possible_truncation)]
            'T' => self.scroll_down(Self::param(params, 0, 1) as i16),
            #[allow(clippy::cast_possible_truncation)]
            'L' => self.insert_lines(Self::param(params, 0, 1) as i16),
            #[allow(clippy::cast_possible_truncation)]
            'M' => self.delete_lines(Self::param(params, 0, 1) as i16),
            _ => {}
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        if let [cmd, payload, ..] = params {
            if matches!(*cmd, b"0" | b"1" | b"2") {
                if let Ok(title) = std::str::from_utf8(payload) {
                    let _ = self.console.set_title(title);
                }
            }
        }
    }
}

impl TranslatorPerformer {
    /// Mode 0: cursor to end of screen, 1: start of screen to cursor,
    /// 2: whole screen. Queries live buffer geometry so the fill spans the
    /// real cell count instead of a hardcoded zero.
    fn erase_display(&mut self, mode: i64) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        let width = i64::from(info.dwSize.X);
        let height = i64::from(info.dwSize.Y);
        let cur_row = i64::from(self.cursor_row);
        let cur_col = i64::from(self.cursor_col);

        let (start_row, start_col, count) = match mode {
            0 => (cur_row, cur_col, (width - cur_col) + (height - cur_row - 1).max(0) * width),
            1 => (0, 0, cur_row * width + cur_col + 1),
            _ => (0, 0, width * height),
        };
        self.fill_blank(info.wAttributes, start_row, start_col, count);
    }

    /// Mode 0: cursor to end of line, 1: start of line to cursor,
    /// 2: whole line.
    fn erase_line(&mut self, mode: i64) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        let width = i64::from(info.dwSize.X);
        let cur_col = i64::from(self.cursor_col);

        let (start_col, count) = match mode {
            0 => (cur_col, width - cur_col),
            1 => (0, cur_col + 1),
            _ => (0, width),
        };
        self.fill_blank(info.wAttributes, i64::from(self.cursor_row), start_col, count);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fill_blank(&self, attrs: u16, row: i64, col: i64, count: i64) {
        let count = count.max(0) as u32;
        let row = row as i16;
        let col = col as i16;
        let _ = self.console.fill_character(u16::from(b' '), count, row, col);
        let _ = self.console.fill_attribute(attrs, count, row, col);
    }

    /// Scrolls the whole buffer up by `n` lines, the effect of `ESC [ n S`:
    /// content moves toward the top and `n` blank lines appear at the
    /// bottom.
    fn scroll_up(&mut self, n: i16) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        self.scroll_region(0, info.dwSize.Y - 1, info.dwSize.X, -n, info.wAttributes);
    }

    /// Scrolls the whole buffer down by `n` lines (`ESC [ n T`).
    fn scroll_down(&mut self, n: i16) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        self.scroll_region(0, info.dwSize.Y - 1, info.dwSize.X, n, info.wAttributes);
    }

    /// Inserts `n` blank lines at the cursor row, pushing the lines below
    /// it down (`ESC [ n L`).
    fn insert_lines(&mut self, n: i16) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        self.scroll_region(self.cursor_row, info.dwSize.Y - 1, info.dwSize.X, n, info.wAttributes);
    }

    /// Deletes `n` lines at the cursor row, pulling the lines below it up
    /// (`ESC [ n M`).
    fn delete_lines(&mut self, n: i16) {
        let Ok(info) = self.console.screen_buffer_info() else { return };
        self.scroll_region(self.cursor_row, info.dwSize.Y - 1, info.dwSize.X, -n, info.wAttributes);
    }

    /// Moves rows `[top, bottom]` (full buffer width) by `dy` rows, filling
    /// the vacated rows with blanks carrying `attrs`.
    fn scroll_region(&mut self, top: i16, bottom: i16, width: i16, dy: i16, attrs: u16) {
        if dy == 0 || top > bottom {
            return;
        }
        let scroll_rect = SMALL_RECT { Left: 0, Top: top, Right: width - 1, Bottom: bottom };
        let fill = CHAR_INFO { Char: CHAR_INFO_0 { UnicodeChar: u16::from(b' ') }, Attributes: attrs };
        let _ = self.console.scroll(scroll_rect, 0, dy, fill);
    }
}
