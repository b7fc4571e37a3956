// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! An immutable run of code points each carrying their own [`Style`].
//!
//! Mirrors a styled-text model seen in `core/tui_styled_text`:
//! parallel arrays rather than a `Vec<(char, Style)>`, so that runs of
//! identically-styled characters can be scanned and coalesced without
//! touching the character data.

use crate::style::color::{Ansi16, Ansi256, Color, ColorDepth, Rgb};
use crate::style::style::{Style, Underline};
use crate::style::width::column_width_at;
use crate::terminal::Terminal;

/// An ordered sequence of code points, each with its own [`Style`].
///
/// `chars` and `styles` always have equal length; `styles[i]` is the style
/// of `chars[i]`. Immutable once built; use [`AttributedStringBuilder`] to
/// accumulate spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributedString {
    chars: Vec<char>,
    styles: Vec<Style>,
}

impl AttributedString {
    #[must_use]
    pub fn new(chars: Vec<char>, styles: Vec<Style>) -> Self {
        assert_eq!(chars.len(), styles.len(), "chars and styles must have equal length");
        AttributedString { chars, styles }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.chars.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.chars.is_empty() }

    #[must_use]
    pub fn chars(&self) -> &[char] { &self.chars }

    #[must_use]
    pub fn styles(&self) -> &[Style] { &self.styles }

    /// The code-point slice `[start, end)`. Panics if out of bounds, same
    /// as slicing a `Vec` would.
    #[must_use]
    pub fn substring(&self, start: usize, end: usize) -> AttributedString {
        AttributedString {
            chars: self.chars[start..end].to_vec(),
            styles: self.styles[start..end].to_vec(),
        }
    }

    /// Concatenate `other` after `self`.
    #[must_use]
    pub fn append(mut self, other: &AttributedString) -> AttributedString {
        self.chars.extend_from_slice(&other.chars);
        self.styles.extend_from_slice(&other.styles);
        self
    }

    /// Total terminal column width of the whole string.
    #[must_use]
    pub fn column_length(&self) -> usize {
        let mut col = 0usize;
        for &ch in &self.chars {
            col += column_width_at(ch, col);
        }
        col
    }

    /// Cuts `[start_col, end_col)` in column space, not code-point space.
    ///
    /// When a cut falls in the middle of a wide glyph, the remaining half
    /// of that glyph's width is padded with spaces carrying the glyph's
    /// style, so that the returned string's `column_length` is always
    /// exactly `end_col - start_col`.
    #[must_use]
    pub fn column_substring(&self, start_col: usize, end_col: usize) -> AttributedString {
        assert!(start_col <= end_col, "start_col must not exceed end_col");

        let mut out_chars = Vec::new();
        let mut out_styles = Vec::new();
        let mut col = 0usize;

        for (&ch, &style) in self.chars.iter().zip(self.styles.iter()) {
            let width = column_width_at(ch, col);
            let glyph_start = col;
            let glyph_end = col + width;
            col = glyph_end;

            if glyph_end <= start_col || glyph_start >= end_col {
                continue;
            }

            let visible_start = glyph_start.max(start_col);
            let visible_end = glyph_end.min(end_col);
            if visible_start == glyph_start && visible_end == glyph_end {
                out_chars.push(ch);
                out_styles.push(style);
            } else {
                // The glyph is clipped by one or both boundaries; pad with
                // spaces of its style for however many columns remain
                // visible.
                for _ in visible_start..visible_end {
                    out_chars.push(' ');
                    out_styles.push(style);
                }
            }
        }

        // If the requested range extends past the string's own width, pad
        // the remainder with default-styled spaces.
        while col < end_col {
            out_chars.push(' ');
            out_styles.push(Style::default());
            col += 1;
        }

        AttributedString { chars: out_chars, styles: out_styles }
    }

    /// Serialize to an ANSI/SGR byte stream appropriate for `terminal`'s
    /// negotiated color depth, honoring `keep_fg`/`keep_bg` bits by
    /// suppressing a reset at style boundaries where they're set.
    #[must_use]
    pub fn to_ansi(&self, terminal: &dyn Terminal) -> String {
        let depth = terminal.color_depth();
        let mut out = String::new();
        let mut current: Option<Style> = None;

        for (&ch, &style) in self.chars.iter().zip(self.styles.iter()) {
            if current != Some(style) {
                emit_transition(&mut out, current, style, depth);
                current = Some(style);
            }
            out.push(ch);
        }

        if current.is_some_and(|s| !s.is_plain()) {
            out.push_str("\x1b[0m");
        }

        out
    }

    /// Parses an SGR/plain-text byte stream back into an [`AttributedString`],
    /// the inverse of [`AttributedString::to_ansi`]. Any CSI sequence other
    /// than an SGR (`...m`) one is dropped rather than treated as text, since
    /// a cursor-movement or erase command carries no character to attach a
    /// style to.
    #[must_use]
    pub fn parse_ansi(input: &str) -> AttributedString {
        let mut chars = Vec::new();
        let mut styles = Vec::new();
        let mut style = Style::default();

        let mut iter = input.chars().peekable();
        while let Some(ch) = iter.next() {
            if ch != '\x1b' || iter.peek() != Some(&'[') {
                chars.push(ch);
                styles.push(style);
                continue;
            }
            iter.next(); // consume '['

            let mut body = String::new();
            let mut final_byte = None;
            for c in iter.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    final_byte = Some(c);
                    break;
                }
                body.push(c);
            }
            if final_byte == Some('m') {
                apply_sgr(&mut style, &body);
            }
            // Any other final byte (cursor move, erase, ...) is swallowed:
            // it has no character to carry a style.
        }

        AttributedString { chars, styles }
    }
}

/// Applies one SGR parameter body (the part between `ESC [` and `m`,
/// e.g. `"0;1;38:2:1:2:3"`) to `style` in place.
fn apply_sgr(style: &mut Style, body: &str) {
    if body.is_empty() {
        *style = Style::default();
        return;
    }

    let mut params = body.split(';').peekable();
    while let Some(param) = params.next() {
        let mut sub = param.split(':');
        let code = sub.next().unwrap_or("");
        match code {
            "" | "0" => *style = Style::default(),
            "1" => style.bold = true,
            "2" => style.faint = true,
            "3" => style.italic = true,
            "4" => {
                style.underline = match sub.next() {
                    Some("2") => Underline::Double,
                    Some("3") => Underline::Curly,
                    Some("4") => Underline::Dotted,
                    Some("5") => Underline::Dashed,
                    _ => Underline::Single,
                };
            }
            "5" => style.blink = true,
            "7" => style.inverse = true,
            "8" => style.conceal = true,
            "9" => style.crossed_out = true,
            "22" => {
                style.bold = false;
                style.faint = false;
            }
            "23" => style.italic = false,
            "24" => style.underline = Underline::None,
            "25" => style.blink = false,
            "27" => style.inverse = false,
            "28" => style.conceal = false,
            "29" => style.crossed_out = false,
            "38" => {
                if let Some(color) = parse_extended_color(&mut sub, &mut params) {
                    style.fg = color;
                }
            }
            "48" => {
                if let Some(color) = parse_extended_color(&mut sub, &mut params) {
                    style.bg = color;
                }
            }
            "39" => style.fg = Color::Default,
            "49" => style.bg = Color::Default,
            other => {
                if let Ok(n) = other.parse::<u8>() {
                    match n {
                        30..=37 => style.fg = ansi16_color(n - 30),
                        40..=47 => style.bg = ansi16_color(n - 40),
                        90..=97 => style.fg = ansi16_color(n - 90 + 8),
                        100..=107 => style.bg = ansi16_color(n - 100 + 8),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn ansi16_color(idx: u8) -> Color {
    Ansi16::from_index(idx).map_or(Color::Default, Color::Ansi16)
}

/// Parses the subparameters of an extended color code (`38`/`48`), accepting
/// both the colon-delimited form this crate's own [`AttributedString::to_ansi`]
/// emits (`38:2:r:g:b`) and the traditional semicolon-delimited form
/// (`38;2;r;g;b`) other emitters use.
fn parse_extended_color<'a>(
    colon: &mut std::str::Split<'a, char>,
    semi: &mut std::iter::Peekable<std::str::Split<'a, char>>,
) -> Option<Color> {
    let mut next = |colon: &mut std::str::Split<'a, char>| colon.next().or_else(|| semi.next());
    match next(colon)? {
        "5" => {
            let index: u8 = next(colon)?.parse().ok()?;
            Some(Color::Ansi256(Ansi256(index)))
        }
        "2" => {
            let r: u8 = next(colon)?.parse().ok()?;
            let g: u8 = next(colon)?.parse().ok()?;
            let b: u8 = next(colon)?.parse().ok()?;
            Some(Color::Rgb(Rgb::new(r, g, b)))
        }
        _ => None,
    }
}

fn emit_transition(out: &mut String, from: Option<Style>, to: Style, depth: ColorDepth) {
    let suppress_fg = from.is_some_and(|f| to.keep_fg && f.fg == to.fg);
    let suppress_bg = from.is_some_and(|f| to.keep_bg && f.bg == to.bg);

    if to.is_plain() {
        if from.is_some_and(|f| !f.is_plain()) {
            out.push_str("\x1b[0m");
        }
        return;
    }

    let mut codes: Vec<String> = vec!["0".to_owned()];
    if to.bold {
        codes.push("1".to_owned());
    }
    if to.faint {
        codes.push("2".to_owned());
    }
    if to.italic {
        codes.push("3".to_owned());
    }
    push_underline_code(&mut codes, to.underline);
    if to.blink {
        codes.push("5".to_owned());
    }
    if to.inverse {
        codes.push("7".to_owned());
    }
    if to.conceal {
        codes.push("8".to_owned());
    }
    if to.crossed_out {
        codes.push("9".to_owned());
    }
    if to.hidden {
        codes.push("8".to_owned());
    }
    if !suppress_fg {
        push_color_codes(&mut codes, to.fg, depth, false);
    }
    if !suppress_bg {
        push_color_codes(&mut codes, to.bg, depth, true);
    }

    out.push_str("\x1b[");
    out.push_str(&codes.join(";"));
    out.push('m');
}

fn push_underline_code(codes: &mut Vec<String>, underline: crate::style::style::Underline) {
    use crate::style::style::Underline as U;
    match underline {
        U::None => {}
        U::Single => codes.push("4".to_owned()),
        U::Double => codes.push("4:2".to_owned()),
        U::Curly => codes.push("4:3".to_owned()),
        U::Dotted => codes.push("4:4".to_owned()),
        U::Dashed => codes.push("4:5".to_owned()),
    }
}

fn push_color_codes(codes: &mut Vec<String>, color: Color, depth: ColorDepth, is_bg: bool) {
    let Some(degraded) = color.degrade_to(depth) else {
        return;
    };
    let base = if is_bg { 40 } else { 30 };
    let base_bright = if is_bg { 100 } else { 90 };
    match degraded {
        Color::Default => {}
        Color::Ansi16(a) => {
            let idx = a as u8;
            if idx < 8 {
                codes.push((u32::from(base) + u32::from(idx)).to_string());
            } else {
                codes.push((u32::from(base_bright) + u32::from(idx) - 8).to_string());
            }
        }
        Color::Ansi256(a) => {
            let prefix = if is_bg { 48 } else { 38 };
            codes.push(format!("{prefix}:5:{}", a.0));
        }
        Color::Rgb(rgb) => {
            let prefix = if is_bg { 48 } else { 38 };
            codes.push(format!("{prefix}:2:{}:{}:{}", rgb.r, rgb.g, rgb.b));
        }
    }
}

/// Accumulates styled spans before freezing them into an immutable
/// [`AttributedString`].
#[derive(Debug, Clone, Default)]
pub struct AttributedStringBuilder {
    chars: Vec<char>,
    styles: Vec<Style>,
}

impl AttributedStringBuilder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append `text` with a single uniform `style`.
    pub fn push_str(&mut self, text: &str, style: Style) -> &mut Self {
        for ch in text.chars() {
            self.chars.push(ch);
            self.styles.push(style);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> AttributedString {
        AttributedString { chars: self.chars, styles: self.styles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::test_fixtures::StubTerminal;

    fn s(text: &str, style: Style) -> AttributedString {
        let mut b = AttributedStringBuilder::new();
        b.push_str(text, style);
        b.build()
    }

    #[test]
    fn column_length_counts_wide_glyphs() {
        let a = s("a中b", Style::default());
        assert_eq!(a.column_length(), 4);
    }

    #[test]
    fn column_substring_pads_clipped_wide_glyph() {
        let a = s("中", Style::default());
        let cut = a.column_substring(0, 1);
        assert_eq!(cut.column_length(), 1);
        assert_eq!(cut.chars(), &[' ']);
    }

    #[test]
    fn column_substring_exact_boundaries_keeps_glyph() {
        let a = s("中", Style::default());
        let cut = a.column_substring(0, 2);
        assert_eq!(cut.chars(), &['中']);
    }

    #[test]
    fn append_concatenates() {
        let a = s("ab", Style::default());
        let b = s("cd", Style::default());
        let joined = a.append(&b);
        assert_eq!(joined.chars(), &['a', 'b', 'c', 'd']);
    }

    #[test]
    fn to_ansi_suppresses_reset_on_keep_fg() {
        let mut first = Style::default();
        first.fg = Color::Rgb(Rgb::new(1, 2, 3));
        let mut second = first;
        second.bold = true;
        second.keep_fg = true;

        let attr = AttributedString::new(vec!['a', 'b'], vec![first, second]);
        let term = StubTerminal::new(ColorDepth::TrueColor);
        let rendered = attr.to_ansi(&term);
        // The foreground color is emitted once on the first transition and
        // must not be repeated on the second, since `keep_fg` is set and
        // the color didn't actually change.
        assert_eq!(rendered.matches("38:2:1:2:3").count(), 1);
    }

    #[test]
    fn parse_ansi_is_the_inverse_of_to_ansi() {
        let mut bold_red = Style::default();
        bold_red.bold = true;
        bold_red.fg = Color::Ansi16(crate::style::color::Ansi16::Red);

        let mut underlined_truecolor_bg = Style::default();
        underlined_truecolor_bg.underline = crate::style::style::Underline::Curly;
        underlined_truecolor_bg.bg = Color::Rgb(Rgb::new(10, 20, 30));

        let original =
            AttributedString::new(vec!['h', 'i', ' ', 'x'], vec![bold_red, bold_red, Style::default(), underlined_truecolor_bg]);

        let term = StubTerminal::new(ColorDepth::TrueColor);
        let rendered = original.to_ansi(&term);
        let parsed = AttributedString::parse_ansi(&rendered);

        assert_eq!(parsed, original);
    }

    #[test]
    fn parse_ansi_passes_plain_text_through_unstyled() {
        let parsed = AttributedString::parse_ansi("hello");
        assert_eq!(parsed.chars(), &['h', 'e', 'l', 'l', 'o']);
        assert!(parsed.styles().iter().all(Style::is_plain));
    }

    #[test]
    fn parse_ansi_drops_non_sgr_csi_sequences() {
        let parsed = AttributedString::parse_ansi("a\x1b[2J\x1b[10;5Hb");
        assert_eq!(parsed.chars(), &['a', 'b']);
    }
}
