// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Terminal dimensions, per `spec.md` §3 "Size".

/// Row/column dimensions of a terminal. Both fields are 16-bit, matching
/// `struct winsize`'s `ws_row`/`ws_col` and Win32's `COORD` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

impl Size {
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self { Size { rows, cols } }
}

impl Default for Size {
    fn default() -> Self { Size { rows: 24, cols: 80 } }
}
