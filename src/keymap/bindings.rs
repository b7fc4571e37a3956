// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Key/mouse event types and the default xterm binding table
//! (`spec.md` §3/§4.2).

use crate::capability::{Database, Param};

use super::trie::Trie;

bitflags::bitflags! {
    /// Modifier mask carried alongside a decoded key, mirroring
    /// [`crate::win32::input_decoder::Modifiers`] for the POSIX input path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

/// A decoded, non-printable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Escape,
    Backspace,
    Enter,
    Tab,
    Function(u8),
}

/// A decoded mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    None,
}

/// A decoded mouse event, column/row 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub pressed: bool,
    pub column: u16,
    pub row: u16,
    pub modifiers: Modifiers,
}

/// What a completed byte sequence decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Key(KeyCode, Modifiers),
    Char(char),
}

/// Decodes an X10-protocol mouse report (`ESC [ M <button> <x> <y>`, each
/// coordinate byte offset by `0x20` and 1-based), per `spec.md` §6's mouse
/// report grammar and §8 scenario 4.
///
/// Returns `None` if `bytes` isn't a complete, well-formed report.
#[must_use]
pub fn decode_x10_mouse(bytes: &[u8]) -> Option<MouseEvent> {
    let rest = bytes.strip_prefix(b"\x1b[M")?;
    let &[button_byte, x_byte, y_byte] = rest else { return None };

    let code = button_byte.checked_sub(0x20)?;
    let modifiers = Modifiers::empty()
        | if code & 0x04 != 0 { Modifiers::SHIFT } else { Modifiers::empty() }
        | if code & 0x08 != 0 { Modifiers::ALT } else { Modifiers::empty() }
        | if code & 0x10 != 0 { Modifiers::CTRL } else { Modifiers::empty() };

    let low = code & 0x03;
    let (button, pressed) = if code & 0x40 != 0 {
        (if low == 0 { MouseButton::WheelUp } else { MouseButton::WheelDown }, true)
    } else {
        match low {
            0 => (MouseButton::Left, true),
            1 => (MouseButton::Middle, true),
            2 => (MouseButton::Right, true),
            _ => (MouseButton::None, false),
        }
    };

    Some(MouseEvent {
        button,
        pressed,
        column: u16::from(x_byte.checked_sub(0x20)?),
        row: u16::from(y_byte.checked_sub(0x20)?),
        modifiers,
    })
}

/// Builds the default trie for a terminal type's `k*` capability strings,
/// per `spec.md` §4.2. Falls back silently on any capability the type
/// doesn't define — a vt100 entry, for instance, has no function keys past
/// F4.
#[must_use]
pub fn default_bindings(db: &Database, terminal_type: &str) -> Trie<Binding> {
    let mut trie = Trie::new();
    let Ok(table) = db.lookup(terminal_type) else {
        return trie;
    };
    let arrows = [
        ("kcuu1", KeyCode::Up),
        ("kcud1", KeyCode::Down),
        ("kcuf1", KeyCode::Right),
        ("kcub1", KeyCode::Left),
        ("khome", KeyCode::Home),
        ("kend", KeyCode::End),
        ("kpp", KeyCode::PageUp),
        ("knp", KeyCode::PageDown),
        ("kich1", KeyCode::Insert),
        ("kdch1", KeyCode::Delete),
    ];
    for (cap, code) in arrows {
        if let Ok(bytes) = table.tputs(cap, &[] as &[Param]) {
            trie.bind(&bytes, Binding::Key(code, Modifiers::empty()));
        }
    }
    for n in 1..=12u8 {
        let cap: &'static str = match n {
            1 => "kf1",
            2 => "kf2",
            3 => "kf3",
            4 => "kf4",
            5 => "kf5",
            6 => "kf6",
            7 => "kf7",
            8 => "kf8",
            9 => "kf9",
            10 => "kf10",
            11 => "kf11",
            _ => "kf12",
        };
        if let Ok(bytes) = table.tputs(cap, &[] as &[Param]) {
            trie.bind(&bytes, Binding::Key(KeyCode::Function(n), Modifiers::empty()));
        }
    }
    trie.bind(b"\x1b", Binding::Key(KeyCode::Escape, Modifiers::empty()));
    trie.bind(b"\r", Binding::Key(KeyCode::Enter, Modifiers::empty()));
    trie.bind(b"\t", Binding::Key(KeyCode::Tab, Modifiers::empty()));
    trie.bind(b"\x7f", Binding::Key(KeyCode::Backspace, Modifiers::empty()));
    trie
}

/// Extracts the pasted text from a complete bracketed-paste envelope
/// (`ESC [ 200 ~ ... ESC [ 201 ~`), per `spec.md` §6/§8 scenario 6. Returns
/// `None` if `bytes` isn't a complete, well-formed envelope.
#[must_use]
pub fn decode_bracketed_paste(bytes: &[u8]) -> Option<String> {
    let rest = bytes.strip_prefix(b"\x1b[200~")?;
    let rest = rest.strip_suffix(b"\x1b[201~")?;
    String::from_utf8(rest.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xterm_arrows_bind_to_expected_codes() {
        let db = Database::embedded();
        let trie = default_bindings(&db, "xterm-256color");
        assert_eq!(trie.lookup(b"\x1b[A"), Some(&Binding::Key(KeyCode::Up, Modifiers::empty())));
        assert_eq!(trie.lookup(b"\x1b[D"), Some(&Binding::Key(KeyCode::Left, Modifiers::empty())));
    }

    #[test]
    fn escape_alone_is_bound() {
        let db = Database::embedded();
        let trie = default_bindings(&db, "xterm-256color");
        assert_eq!(trie.lookup(b"\x1b"), Some(&Binding::Key(KeyCode::Escape, Modifiers::empty())));
    }

    #[test]
    fn x10_mouse_report_decodes_left_press_at_one_one() {
        let event = decode_x10_mouse(b"\x1b[M\x20\x21\x21").unwrap();
        assert_eq!(event, MouseEvent { button: MouseButton::Left, pressed: true, column: 1, row: 1, modifiers: Modifiers::empty() });
    }

    #[test]
    fn truncated_report_is_none() {
        assert!(decode_x10_mouse(b"\x1b[M\x20\x21").is_none());
    }

    #[test]
    fn bracketed_paste_envelope_yields_inner_text() {
        assert_eq!(decode_bracketed_paste(b"\x1b[200~hello\n\x1b[201~").as_deref(), Some("hello\n"));
    }

    #[test]
    fn paste_without_closing_marker_is_none() {
        assert!(decode_bracketed_paste(b"\x1b[200~hello\n").is_none());
    }
}
