// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! End-to-end scenarios exercising the public API across module
//! boundaries, grounded in `spec.md` §8's concrete examples. Run with
//! `cargo test --features test-fixtures`.

#![cfg(feature = "test-fixtures")]

use std::time::Duration;

use termcraft::capability::Database;
use termcraft::display::{CursorPos, Screen};
use termcraft::keymap::{decode_bracketed_paste, decode_x10_mouse, BindingReader, Binding, KeyCode, Modifiers, MouseButton, MouseEvent, Trie};
use termcraft::style::{AttributedString, Style};
use termcraft::terminal::{StubTerminal, Terminal};

fn plain(s: &str) -> AttributedString {
    let chars: Vec<char> = s.chars().collect();
    let styles = vec![Style::default(); chars.len()];
    AttributedString::new(chars, styles)
}

#[test]
fn raw_mode_round_trip_preserves_prior_attributes() {
    let mut term = StubTerminal::new(termcraft::style::ColorDepth::Ansi256);
    let snapshot = term.get_attributes().unwrap();
    let pre_raw = term.enter_raw_mode().unwrap();
    assert_eq!(pre_raw, snapshot);

    term.writer().write(b"hi").unwrap();
    term.writer().flush().unwrap();
    assert_eq!(term.take_output(), b"hi");

    term.set_attributes(pre_raw.clone()).unwrap();
    assert_eq!(term.get_attributes().unwrap(), snapshot);
}

#[test]
fn diff_rendering_writes_only_the_changed_tail() {
    let db = Database::embedded();
    let table = db.lookup("xterm-256color").unwrap();
    let mut screen = Screen::new(24, 80);
    let mut term = StubTerminal::new(termcraft::style::ColorDepth::Ansi256);

    screen.update(&mut term, table, &[plain("foo"), plain("bar")], CursorPos { row: 1, col: 3 }).unwrap();
    term.take_output();

    screen.update(&mut term, table, &[plain("foo"), plain("baz")], CursorPos { row: 1, col: 3 }).unwrap();
    let out = term.take_output();

    assert!(out.contains(&b'z'), "expected the new 'z' written: {out:?}");
    assert!(!out.windows(3).any(|w| w == b"bar"), "expected no full rewrite of the unchanged prefix: {out:?}");
}

#[test]
fn display_update_is_idempotent() {
    let db = Database::embedded();
    let table = db.lookup("xterm-256color").unwrap();
    let mut screen = Screen::new(24, 80);
    let mut term = StubTerminal::new(termcraft::style::ColorDepth::Ansi256);

    let frame = [plain("same"), plain("frame")];
    screen.update(&mut term, table, &frame, CursorPos::default()).unwrap();
    term.take_output();

    screen.update(&mut term, table, &frame, CursorPos::default()).unwrap();
    assert!(term.take_output().is_empty());
}

#[test]
fn ambiguity_timeout_commits_escape_alone_after_the_window() {
    let mut trie: Trie<Binding> = Trie::new();
    trie.bind(b"\x1b", Binding::Key(KeyCode::Escape, Modifiers::empty()));
    trie.bind(b"\x1b[A", Binding::Key(KeyCode::Up, Modifiers::empty()));

    let mut reader = BindingReader::new(&trie).with_ambiguous_timeout(Duration::from_millis(150));
    assert_eq!(reader.feed(0x1b), termcraft::keymap::Decoded::Pending);
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(reader.poll_timeout(), Some(Binding::Key(KeyCode::Escape, Modifiers::empty())));

    let mut reader = BindingReader::new(&trie).with_ambiguous_timeout(Duration::from_millis(150));
    reader.feed(0x1b);
    reader.feed(b'[');
    assert_eq!(reader.feed(b'A'), termcraft::keymap::Decoded::Committed(Binding::Key(KeyCode::Up, Modifiers::empty())));
}

#[test]
fn mouse_click_decodes_to_left_press_at_one_one() {
    let event = decode_x10_mouse(b"\x1b[M\x20\x21\x21").unwrap();
    assert_eq!(
        event,
        MouseEvent { button: MouseButton::Left, pressed: true, column: 1, row: 1, modifiers: Modifiers::empty() }
    );
}

#[test]
fn bracketed_paste_envelope_yields_inner_text() {
    assert_eq!(decode_bracketed_paste(b"\x1b[200~hello\n\x1b[201~").as_deref(), Some("hello\n"));
}

#[test]
fn styled_text_survives_an_ansi_round_trip() {
    let mut bold = Style::default();
    bold.bold = true;
    let styled = AttributedString::new(vec!['h', 'i'], vec![bold, bold]);

    let term = StubTerminal::new(termcraft::style::ColorDepth::Ansi256);
    let rendered = styled.to_ansi(&term);
    assert_eq!(AttributedString::parse_ansi(&rendered), styled);
}

#[test]
fn cost_cache_survives_interleaved_resize_and_render() {
    let db = Database::embedded();
    let table = db.lookup("xterm-256color").unwrap();
    let mut screen = Screen::new(24, 80);
    let mut term = StubTerminal::new(termcraft::style::ColorDepth::Ansi256);

    for i in 0..50u16 {
        screen.resize(24, 80);
        screen.update(&mut term, table, &[plain("row"), plain(&i.to_string())], CursorPos::default()).unwrap();
        term.take_output();
    }
}
