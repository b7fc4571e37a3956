// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Color model: a tagged union of {default, 4-bit indexed, 8-bit indexed,
//! 24-bit RGB}, plus the degradation path used by the serializer and the
//! Windows legacy-console translator when a destination device supports
//! less precision than the application asked for.
//!
//! Mirrors the `core/ansi/color` module (`AnsiValue`,
//! `RgbValue`, `TransformColor`).

/// How many distinct colors a destination device can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorDepth {
    /// The 16 named ANSI colors (8 normal + 8 bright).
    Ansi16,
    /// The 256-color indexed palette.
    Ansi256,
    /// 24-bit truecolor.
    TrueColor,
}

/// A color in the ANSI 256-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ansi256(pub u8);

/// A 24-bit truecolor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }
}

/// The 16 named ANSI colors, in the conventional palette order (indices 0-7
/// normal, 8-15 bright).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Ansi16 {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl Ansi16 {
    /// The inverse of the `as u8` cast used to emit SGR codes: index 0-15
    /// in the same Black..BrightWhite order back to its variant.
    #[must_use]
    pub const fn from_index(idx: u8) -> Option<Ansi16> {
        Some(match idx {
            0 => Ansi16::Black,
            1 => Ansi16::Red,
            2 => Ansi16::Green,
            3 => Ansi16::Yellow,
            4 => Ansi16::Blue,
            5 => Ansi16::Magenta,
            6 => Ansi16::Cyan,
            7 => Ansi16::White,
            8 => Ansi16::BrightBlack,
            9 => Ansi16::BrightRed,
            10 => Ansi16::BrightGreen,
            11 => Ansi16::BrightYellow,
            12 => Ansi16::BrightBlue,
            13 => Ansi16::BrightMagenta,
            14 => Ansi16::BrightCyan,
            15 => Ansi16::BrightWhite,
            _ => return None,
        })
    }
}

/// The 6x6x6 color cube plus grayscale ramp that makes up indices 16-255 of
/// the standard xterm 256-color palette.
const XTERM_256_PALETTE: [(u8, u8, u8); 256] = build_xterm_256_palette();

const fn build_xterm_256_palette() -> [(u8, u8, u8); 256] {
    let mut table = [(0u8, 0u8, 0u8); 256];

    // Indices 0-15: the 16 standard ANSI colors (xterm defaults).
    const BASE16: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];
    let mut i = 0;
    while i < 16 {
        table[i] = BASE16[i];
        i += 1;
    }

    // Indices 16-231: the 6x6x6 color cube.
    const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let mut idx = 16usize;
    let mut r = 0;
    while r < 6 {
        let mut g = 0;
        while g < 6 {
            let mut b = 0;
            while b < 6 {
                table[idx] = (STEPS[r], STEPS[g], STEPS[b]);
                idx += 1;
                b += 1;
            }
            g += 1;
        }
        r += 1;
    }

    // Indices 232-255: grayscale ramp.
    let mut gray = 0u8;
    while idx < 256 {
        let level = 8 + gray * 10;
        table[idx] = (level, level, level);
        idx += 1;
        gray += 1;
    }

    table
}

/// Degrades a color to progressively less precise representations.
///
/// This is the exact path the `spec.md` §4.5 legacy-console translator and
/// §3 `AttributedString::to_ansi` serializer both need: truecolor -> 256 ->
/// 16 -> grayscale.
pub trait TransformColor {
    fn as_rgb(&self) -> Rgb;
    fn as_ansi256(&self) -> Ansi256;
    fn as_ansi16(&self) -> Ansi16;
    fn as_grayscale_ansi256(&self) -> Ansi256;
}

impl TransformColor for Rgb {
    fn as_rgb(&self) -> Rgb { *self }

    fn as_ansi256(&self) -> Ansi256 {
        // Nearest-Euclidean-distance match against the full 256-entry
        // palette. Exact at the 16 primary corners and at the grayscale
        // ramp, per spec.md §9's open question on rounding.
        let mut best_idx = 16u8;
        let mut best_dist = u32::MAX;
        for (idx, &(pr, pg, pb)) in XTERM_256_PALETTE.iter().enumerate() {
            let dr = i32::from(self.r) - i32::from(pr);
            let dg = i32::from(self.g) - i32::from(pg);
            let db = i32::from(self.b) - i32::from(pb);
            #[allow(clippy::cast_sign_loss)]
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                #[allow(clippy::cast_possible_truncation)]
                {
                    best_idx = idx as u8;
                }
            }
        }
        Ansi256(best_idx)
    }

    fn as_ansi16(&self) -> Ansi16 {
        const PRIMARIES: [(Ansi16, (u8, u8, u8)); 16] = [
            (Ansi16::Black, (0, 0, 0)),
            (Ansi16::Red, (205, 0, 0)),
            (Ansi16::Green, (0, 205, 0)),
            (Ansi16::Yellow, (205, 205, 0)),
            (Ansi16::Blue, (0, 0, 238)),
            (Ansi16::Magenta, (205, 0, 205)),
            (Ansi16::Cyan, (0, 205, 205)),
            (Ansi16::White, (229, 229, 229)),
            (Ansi16::BrightBlack, (127, 127, 127)),
            (Ansi16::BrightRed, (255, 0, 0)),
            (Ansi16::BrightGreen, (0, 255, 0)),
            (Ansi16::BrightYellow, (255, 255, 0)),
            (Ansi16::BrightBlue, (92, 92, 255)),
            (Ansi16::BrightMagenta, (255, 0, 255)),
            (Ansi16::BrightCyan, (0, 255, 255)),
            (Ansi16::BrightWhite, (255, 255, 255)),
        ];
        let mut best = Ansi16::White;
        let mut best_dist = u32::MAX;
        for (name, (pr, pg, pb)) in PRIMARIES {
            let dr = i32::from(self.r) - i32::from(pr);
            let dg = i32::from(self.g) - i32::from(pg);
            let db = i32::from(self.b) - i32::from(pb);
            #[allow(clippy::cast_sign_loss)]
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = name;
            }
        }
        best
    }

    fn as_grayscale_ansi256(&self) -> Ansi256 {
        // Rec. 601 luma.
        let luma = 0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Rgb::new(luma as u8, luma as u8, luma as u8).as_ansi256()
    }
}

impl TransformColor for Ansi256 {
    fn as_rgb(&self) -> Rgb {
        let (r, g, b) = XTERM_256_PALETTE[self.0 as usize];
        Rgb::new(r, g, b)
    }

    fn as_ansi256(&self) -> Ansi256 { *self }

    fn as_ansi16(&self) -> Ansi16 { self.as_rgb().as_ansi16() }

    fn as_grayscale_ansi256(&self) -> Ansi256 { self.as_rgb().as_grayscale_ansi256() }
}

/// A color as the application expressed it: default (inherit terminal fg/bg),
/// or one of the three precision tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Ansi16(Ansi16),
    Ansi256(Ansi256),
    Rgb(Rgb),
}

impl Color {
    /// Degrade this color to fit within `depth`, returning `None` for
    /// [`Color::Default`] (nothing to degrade).
    #[must_use]
    pub fn degrade_to(&self, depth: ColorDepth) -> Option<Color> {
        match (self, depth) {
            (Color::Default, _) => None,
            (c, ColorDepth::TrueColor) => Some(*c),
            (Color::Ansi16(_), _) => Some(*self),
            (Color::Ansi256(a), ColorDepth::Ansi256) => Some(Color::Ansi256(*a)),
            (Color::Ansi256(a), ColorDepth::Ansi16) => Some(Color::Ansi16(a.as_ansi16())),
            (Color::Rgb(rgb), ColorDepth::Ansi256) => Some(Color::Ansi256(rgb.as_ansi256())),
            (Color::Rgb(rgb), ColorDepth::Ansi16) => Some(Color::Ansi16(rgb.as_ansi16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Rgb::new(0, 0, 0), Ansi256(16))]
    #[test_case(Rgb::new(255, 255, 255), Ansi256(231))]
    fn rgb_to_ansi256_corners(rgb: Rgb, expected: Ansi256) {
        assert_eq!(rgb.as_ansi256(), expected);
    }

    #[test_case(Rgb::new(0, 0, 0), Ansi16::Black)]
    #[test_case(Rgb::new(255, 0, 0), Ansi16::BrightRed)]
    #[test_case(Rgb::new(255, 255, 255), Ansi16::BrightWhite)]
    fn rgb_to_ansi16_corners(rgb: Rgb, expected: Ansi16) {
        assert_eq!(rgb.as_ansi16(), expected);
    }

    #[test]
    fn grayscale_is_achromatic() {
        let gray = Rgb::new(128, 128, 128).as_grayscale_ansi256();
        let (r, g, b) = (gray.as_rgb().r, gray.as_rgb().g, gray.as_rgb().b);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn degrade_default_is_noop() {
        assert_eq!(Color::Default.degrade_to(ColorDepth::Ansi16), None);
    }

    #[test]
    fn degrade_truecolor_to_ansi16_roundtrips_corner() {
        let c = Color::Rgb(Rgb::new(0, 0, 0));
        assert_eq!(c.degrade_to(ColorDepth::Ansi16), Some(Color::Ansi16(Ansi16::Black)));
    }
}
