// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Decodes Win32 `INPUT_RECORD` values into the byte stream a VT terminal
//! would have emitted for the same key/mouse/window event, per
//! `spec.md` §4.4.
//!
//! No sibling crate here does Win32 input decoding directly (input is
//! usually delegated entirely to `crossterm`); built instead against the
//! `windows-sys` call shape used by other Windows console glue
//! (`helix-editor-termina`, `kkawakam-rustyline`), and against `core/ansi`'s
//! escape sequence constants for the terminfo-capability mapping this
//! module produces bytes for.

#![cfg(windows)]

use windows_sys::Win32::UI::Input::KeyboardAndMouse::VIRTUAL_KEY;

/// Decoded control-key-state bits, independent of Win32's raw bitmask
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub control: bool,
}

impl Modifiers {
    /// `spec.md` §6 "Extended-modifier key encoding": `1 + (Shift|Alt<<1|Control<<2)`.
    #[must_use]
    pub fn xterm_param(self) -> u8 {
        1 + u8::from(self.shift) + (u8::from(self.alt) << 1) + (u8::from(self.control) << 2)
    }

    #[must_use]
    pub fn from_control_key_state(state: u32) -> Self {
        // Win32 `CONTROL_KEY_STATE` bitmask: bit 0x10 = right alt, 0x02 =
        // left alt, 0x08 = right ctrl, 0x04 = left ctrl, 0x10|0x20 = shift.
        Modifiers {
            shift: state & 0x0010 != 0,
            alt: state & (0x0001 | 0x0002) != 0,
            control: state & (0x0004 | 0x0008) != 0,
        }
    }
}

/// One decoded key-down event, already split from repeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub bytes: Vec<u8>,
}

/// Maps an arrow/navigation/function virtual-key code to its terminfo-style
/// CSI final byte, or `None` if the key has no escape-sequence form (it
/// should be decoded from its Unicode character instead).
#[must_use]
fn vk_to_csi_final(vk: VIRTUAL_KEY) -> Option<u8> {
    match vk {
        0x25 => Some(b'D'), // VK_LEFT
        0x26 => Some(b'A'), // VK_UP
        0x27 => Some(b'C'), // VK_RIGHT
        0x28 => Some(b'B'), // VK_DOWN
        0x24 => Some(b'H'), // VK_HOME
        0x23 => Some(b'F'), // VK_END
        _ => None,
    }
}

fn vk_to_tilde_sequence(vk: VIRTUAL_KEY) -> Option<u8> {
    match vk {
        0x21 => Some(5), // VK_PRIOR (PgUp)
        0x22 => Some(6), // VK_NEXT (PgDn)
        0x2D => Some(2), // VK_INSERT
        0x2E => Some(3), // VK_DELETE
        _ => None,
    }
}

fn vk_to_function_key(vk: VIRTUAL_KEY) -> Option<u8> {
    // VK_F1..VK_F12 are 0x70..=0x7B.
    if (0x70..=0x7B).contains(&vk) {
        Some((vk - 0x70 + 1) as u8)
    } else {
        None
    }
}

/// Decodes one key-down event, per `spec.md` §4.4's bullet list.
///
/// `unicode_char` is the record's `UnicodeChar` field; `0` means "no
/// character, decode from `vk` instead".
#[must_use]
pub fn decode_key_down(vk: VIRTUAL_KEY, unicode_char: u16, modifiers: Modifiers, repeat_count: u16) -> DecodedKey {
    let one_press = decode_single_key(vk, unicode_char, modifiers);
    let mut bytes = Vec::with_capacity(one_press.len() * usize::from(repeat_count.max(1)));
    for _ in 0..repeat_count.max(1) {
        bytes.extend_from_slice(&one_press);
    }
    DecodedKey { bytes }
}

fn decode_single_key(vk: VIRTUAL_KEY, unicode_char: u16, modifiers: Modifiers) -> Vec<u8> {
    if unicode_char != 0 {
        if modifiers.alt && !modifiers.control {
            if let Some(ch) = char::from_u32(u32::from(unicode_char)) {
                let mut bytes = vec![0x1b];
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                return bytes;
            }
        }
        if modifiers.control {
            if let Some(ch) = char::from_u32(u32::from(unicode_char)) {
                if ch.is_ascii_alphabetic() {
                    return vec![(ch.to_ascii_uppercase() as u8) - b'A' + 1];
                }
            }
        }
        if let Some(ch) = char::from_u32(u32::from(unicode_char)) {
            let mut buf = [0u8; 4];
            return ch.encode_utf8(&mut buf).as_bytes().to_vec();
        }
    }

    if let Some(tilde_code) = vk_to_tilde_sequence(vk) {
        return build_csi(modifiers, &tilde_code.to_string(), b'~');
    }
    if let Some(fkey) = vk_to_function_key(vk) {
        // xterm encodes F1-F4 as SS3 and F5-F12 as CSI ... ~; collapse to
        // the CSI ~ form uniformly with the standard xterm numbers.
        const F_KEY_CODES: [u16; 12] = [11, 12, 13, 14, 15, 17, 18, 19, 20, 21, 23, 24];
        let code = F_KEY_CODES[usize::from(fkey - 1)];
        return build_csi(modifiers, &code.to_string(), b'~');
    }
    if let Some(final_byte) = vk_to_csi_final(vk) {
        return build_csi(modifiers, "", final_byte);
    }
    if vk == 0x08 {
        return vec![0x7f]; // VK_BACK
    }

    Vec::new()
}

fn build_csi(modifiers: Modifiers, leading_param: &str, final_byte: u8) -> Vec<u8> {
    let mut out = vec![0x1b, b'['];
    if modifiers == Modifiers::default() {
        out.extend_from_slice(leading_param.as_bytes());
    } else if leading_param.is_empty() {
        out.extend_from_slice(b"1;");
        out.extend_from_slice(modifiers.xterm_param().to_string().as_bytes());
    } else {
        out.extend_from_slice(leading_param.as_bytes());
        out.push(b';');
        out.extend_from_slice(modifiers.xterm_param().to_string().as_bytes());
    }
    out.push(final_byte);
    out
}

/// Mouse tracking mode, matching the set `spec.md` §6 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    Off,
    Normal,
    Button,
    Any,
}

/// Encodes a mouse event per `spec.md` §4.4, either X10/normal or SGR
/// form. `button` is 0=left, 1=middle, 2=right, 3=release.
#[must_use]
pub fn encode_mouse_event(button: u8, col: u16, row: u16, sgr: bool) -> Vec<u8> {
    if sgr {
        format!("\x1b[<{button};{};{}{}", col, row, if button == 3 { 'm' } else { 'M' }).into_bytes()
    } else {
        #[allow(clippy::cast_possible_truncation)]
        vec![0x1b, b'[', b'M', 32 + button, 32 + col.min(223) as u8, 32 + row.min(223) as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_alpha_produces_control_char() {
        let bytes = decode_single_key(0, u16::from(b'a'), Modifiers { control: true, ..Default::default() });
        assert_eq!(bytes, vec![0x01]);
    }

    #[test]
    fn alt_prefixes_esc() {
        let bytes = decode_single_key(0, u16::from(b'a'), Modifiers { alt: true, ..Default::default() });
        assert_eq!(bytes, vec![0x1b, b'a']);
    }

    #[test]
    fn control_right_with_shift_matches_xterm_encoding() {
        let bytes = decode_single_key(0x27, 0, Modifiers { control: true, ..Default::default() });
        assert_eq!(bytes, b"\x1b[1;5C");
    }
}
