// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Per-character visual attributes.
//!
//! Mirrors `TuiStyleAttribs` (`core/tui_style`): a flat,
//! `Copy + Eq + Hash` attribute set rather than a crossterm-style
//! `Attribute` bitflags enum, because individual attributes here (the
//! underline variant, the two `keep` bits) carry more than one bit of
//! information.

use crate::style::color::Color;

/// Underline rendering variants a terminal may support via SGR 4 with a
/// colon-separated subparameter (`4:1` .. `4:5`), falling back to a plain
/// single underline when the terminal lacks extended underline support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// The full set of visual attributes that can apply to one character cell.
///
/// Equality is bitwise/structural: two styles compare equal only if every
/// field matches, including the `keep_fg`/`keep_bg` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: Underline,
    pub blink: bool,
    pub inverse: bool,
    pub conceal: bool,
    pub crossed_out: bool,
    pub hidden: bool,
    /// When set, a renderer transitioning away from this style must not
    /// emit a foreground reset/override; the previous foreground bleeds
    /// through. Used by the Display diff engine to avoid redundant SGR
    /// sequences across adjacent cells that only differ in an unrelated
    /// attribute.
    pub keep_fg: bool,
    /// As `keep_fg`, for the background color.
    pub keep_bg: bool,
}

impl Style {
    #[must_use]
    pub const fn plain() -> Self {
        Style {
            fg: Color::Default,
            bg: Color::Default,
            bold: false,
            faint: false,
            italic: false,
            underline: Underline::None,
            blink: false,
            inverse: false,
            conceal: false,
            crossed_out: false,
            hidden: false,
            keep_fg: false,
            keep_bg: false,
        }
    }

    /// Whether every attribute bit is at its default (no SGR codes needed
    /// to express this style).
    #[must_use]
    pub fn is_plain(&self) -> bool { *self == Style::plain() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain() {
        assert!(Style::default().is_plain());
    }

    #[test]
    fn equality_is_bitwise() {
        let mut a = Style::plain();
        let mut b = Style::plain();
        assert_eq!(a, b);
        a.keep_fg = true;
        assert_ne!(a, b);
        b.keep_fg = true;
        assert_eq!(a, b);
    }
}
