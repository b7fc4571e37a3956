// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The diff-rendering display engine (`spec.md` §4.7): holds the
//! previously rendered frame, compares it against each new frame, and
//! writes only the minimal capability/text sequence needed to converge the
//! physical screen.

use crate::capability::{Database, Param, Table};
use crate::error::Result;
use crate::style::AttributedString;
use crate::terminal::Terminal;

use super::cost_cache::CostCache;
use super::diff::{cheapest_move, diff_line, LineDiff};

/// A cursor position in row/column coordinates, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// If more than this fraction of rows differ, a full `clear_screen` plus
/// redraw beats per-line diffing, per `spec.md` §4.7 "When the entire frame
/// differs beyond a threshold".
pub const FULL_REDRAW_THRESHOLD: f64 = 0.6;

/// Holds the previously rendered frame and diffs each new one against it,
/// per `spec.md` §4.7.
#[derive(Debug)]
pub struct Screen {
    rows: usize,
    cols: usize,
    previous: Option<Vec<AttributedString>>,
    cursor: CursorPos,
    cost_cache: CostCache,
}

impl Screen {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Screen { rows, cols, previous: None, cursor: CursorPos::default(), cost_cache: CostCache::new() }
    }

    /// Invalidates the stored frame so the next [`Screen::update`] redraws
    /// from scratch, and adopts the new dimensions.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.previous = None;
        self.cost_cache.clear();
    }

    /// Discards the stored frame without touching the physical screen;
    /// the next [`Screen::update`] redraws from scratch.
    pub fn clear(&mut self) { self.previous = None; }

    /// Clears the stored frame and writes `clear_screen` to the physical
    /// terminal.
    ///
    /// # Errors
    /// Propagates write failures from `terminal`.
    pub fn reset(&mut self, terminal: &mut dyn Terminal, table: &Table) -> Result<()> {
        self.previous = None;
        if let Ok(bytes) = table.tputs("clear", &[] as &[Param]) {
            terminal.writer().write(&bytes)?;
        }
        self.cursor = CursorPos::default();
        Ok(())
    }

    /// Renders `new_lines` against the stored previous frame, writing the
    /// minimal sequence of capability strings and text needed, then moves
    /// the cursor to `cursor_pos` and flushes.
    ///
    /// # Errors
    /// Propagates write failures from `terminal`.
    pub fn update(
        &mut self,
        terminal: &mut dyn Terminal,
        table: &Table,
        new_lines: &[AttributedString],
        cursor_pos: CursorPos,
    ) -> Result<()> {
        let changed = match &self.previous {
            None => new_lines.len(),
            Some(previous) => previous
                .iter()
                .zip(new_lines.iter())
                .filter(|(a, b)| a != b)
                .count()
                .max(new_lines.len().saturating_sub(previous.len())),
        };
        #[allow(clippy::cast_precision_loss)]
        let full_redraw =
            self.previous.is_none() || (changed as f64 / new_lines.len().max(1) as f64) > FULL_REDRAW_THRESHOLD;

        if full_redraw {
            self.full_redraw(terminal, table, new_lines)?;
        } else {
            self.patch(terminal, table, new_lines)?;
        }

        self.move_cursor(terminal, table, cursor_pos)?;
        terminal.writer().flush()?;
        self.previous = Some(new_lines.to_vec());
        self.cursor = cursor_pos;
        Ok(())
    }

    fn full_redraw(&mut self, terminal: &mut dyn Terminal, table: &Table, new_lines: &[AttributedString]) -> Result<()> {
        if let Ok(bytes) = table.tputs("clear", &[] as &[Param]) {
            terminal.writer().write(&bytes)?;
        }
        for (row, line) in new_lines.iter().enumerate() {
            self.write_at(terminal, table, row, 0, line)?;
            self.cursor = CursorPos { row, col: line.column_length() };
        }
        Ok(())
    }

    fn patch(&mut self, terminal: &mut dyn Terminal, table: &Table, new_lines: &[AttributedString]) -> Result<()> {
        let previous = self.previous.clone().unwrap_or_default();
        for row in 0..new_lines.len() {
            let old_line = previous.get(row).cloned().unwrap_or_default();
            match diff_line(&old_line, &new_lines[row]) {
                LineDiff::Unchanged => {}
                LineDiff::Patch { start_col, content, clear_to_eol } => {
                    self.write_at(terminal, table, row, start_col, &content)?;
                    if clear_to_eol {
                        if let Ok(bytes) = table.tputs("el", &[] as &[Param]) {
                            terminal.writer().write(&bytes)?;
                        }
                    }
                    self.cursor = CursorPos { row, col: start_col + content.column_length() };
                }
            }
        }
        Ok(())
    }

    fn write_at(
        &mut self,
        terminal: &mut dyn Terminal,
        table: &Table,
        row: usize,
        col: usize,
        content: &AttributedString,
    ) -> Result<()> {
        self.move_cursor(terminal, table, CursorPos { row, col })?;
        let text = content.to_ansi(terminal);
        terminal.writer().write(text.as_bytes())?;
        Ok(())
    }

    fn move_cursor(&mut self, terminal: &mut dyn Terminal, table: &Table, to: CursorPos) -> Result<()> {
        if to == self.cursor {
            return Ok(());
        }
        let bytes = cheapest_move(table, &self.cost_cache, self.cursor.row, self.cursor.col, to.row, to.col);
        terminal.writer().write(&bytes)?;
        self.cursor = to;
        Ok(())
    }

    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) { (self.rows, self.cols) }
}

/// Parses a cursor-position report of the form `ESC [ r ; c R` (1-based),
/// per `spec.md` §4.7 "Cursor-position tracking", returning 0-based
/// `(row, col)`.
#[must_use]
pub fn parse_cursor_position_report(bytes: &[u8]) -> Option<(usize, usize)> {
    let s = std::str::from_utf8(bytes).ok()?;
    let body = s.strip_prefix("\x1b[")?.strip_suffix('R')?;
    let (row, col) = body.split_once(';')?;
    let row: usize = row.parse().ok()?;
    let col: usize = col.parse().ok()?;
    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

/// Resolves the terminal's capability table for the display engine, using
/// `terminal_type` as the lookup key against `db`.
///
/// # Errors
/// Propagates [`crate::error::TermError::CapabilityAbsent`] if
/// `terminal_type` isn't known to `db`.
pub fn resolve_table<'a>(db: &'a Database, terminal_type: &str) -> Result<&'a Table> { db.lookup(terminal_type) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_position_report_parses_to_zero_based() {
        assert_eq!(parse_cursor_position_report(b"\x1b[5;10R"), Some((4, 9)));
    }

    #[test]
    fn malformed_report_is_none() {
        assert_eq!(parse_cursor_position_report(b"garbage"), None);
    }

    #[test]
    fn new_screen_has_no_previous_frame() {
        let screen = Screen::new(24, 80);
        assert_eq!(screen.dimensions(), (24, 80));
        assert!(screen.previous.is_none());
    }
}
