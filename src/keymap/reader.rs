// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The ambiguity-timeout binding reader (`spec.md` §4.2): greedily matches
//! the longest bound sequence, but when a shorter binding is itself a
//! prefix of a longer one, waits up to `ambiguous_timeout` for a
//! disambiguating byte before committing to the shorter match.
//!
//! Mirrors `PTYInputDevice`'s own raw-byte-to-event
//! decode loop (`tui::core::pty_mux`), which drives a state machine off a
//! `channel::Receiver` with the same "wait, then commit" shape this reader
//! needs; reused here as a standalone synchronous reader rather than an
//! async task since `spec.md` names no async runtime dependency.

use std::time::{Duration, Instant};

use crate::error::{Result, TermError};

use super::bindings::Binding;
use super::trie::{Step, Trie};

/// Default wait for a disambiguating byte after a match that is also a
/// prefix of a longer binding, per `spec.md` §4.2.
pub const DEFAULT_AMBIGUOUS_TIMEOUT: Duration = Duration::from_millis(150);

/// What [`BindingReader::feed`] produced after consuming the available
/// bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A binding committed; `consumed` bytes of the walk are spent.
    Committed(Binding),
    /// A single byte didn't extend any binding and there's no unicode/
    /// unknown sink configured; the caller should treat `byte` as raw
    /// data (or, per `spec.md`, raise it as an error if the reader is
    /// configured to do so).
    Raw(u8),
    /// The walk matched a prefix but is not yet resolvable: either no
    /// byte has arrived yet, or a match-that's-also-a-prefix is still
    /// within its ambiguity window.
    Pending,
}

/// Consumes a byte stream against a [`Trie`] of bindings, applying the
/// ambiguity-timeout commit rule.
#[derive(Debug)]
pub struct BindingReader<'a> {
    trie: &'a Trie<Binding>,
    ambiguous_timeout: Duration,
    state: Option<PendingWalk<'a>>,
}

#[derive(Debug)]
struct PendingWalk<'a> {
    walk: super::trie::Walk<'a, Binding>,
    /// Set once the walk has landed on a node that is both a value and a
    /// prefix — the clock the ambiguity timeout is measured against.
    ambiguous_since: Option<Instant>,
    last_value: Option<Binding>,
}

impl<'a> BindingReader<'a> {
    #[must_use]
    pub fn new(trie: &'a Trie<Binding>) -> Self {
        BindingReader { trie, ambiguous_timeout: DEFAULT_AMBIGUOUS_TIMEOUT, state: None }
    }

    #[must_use]
    pub fn with_ambiguous_timeout(mut self, timeout: Duration) -> Self {
        self.ambiguous_timeout = timeout;
        self
    }

    /// Feeds one byte. Returns `Pending` while more bytes (or time) are
    /// needed, `Committed`/`Raw` once a decision is reached.
    ///
    /// A byte that doesn't extend a buffered prefix abandons that prefix
    /// and starts a fresh walk with this byte, rather than reporting the
    /// dead end — the abandoned bytes are lost, matching how a terminal
    /// input decoder treats an interrupted escape sequence.
    pub fn feed(&mut self, byte: u8) -> Decoded {
        let walk = self.state.take().map_or_else(|| self.trie.walk(), |pending| pending.walk);
        let (next, step) = walk.step(byte);
        if next.is_none() {
            let (next, step) = self.trie.walk().step(byte);
            self.apply(next, step, byte)
        } else {
            self.apply(next, step, byte)
        }
    }

    fn apply(&mut self, next: Option<super::trie::Walk<'a, Binding>>, step: Step, byte: u8) -> Decoded {
        match (next, step) {
            (None, _) => Decoded::Raw(byte),
            (Some(next), Step::Exact) => Decoded::Committed(next.value().cloned().expect("Exact implies value")),
            (Some(next), Step::Prefix) => {
                self.state = Some(PendingWalk { walk: next, ambiguous_since: None, last_value: None });
                Decoded::Pending
            }
            (Some(next), Step::ExactAndMore) => {
                let value = next.value().cloned();
                self.state = Some(PendingWalk { walk: next, ambiguous_since: Some(Instant::now()), last_value: value });
                Decoded::Pending
            }
            (Some(_), Step::Dead) => unreachable!("Walk::step never returns (Some, Dead)"),
        }
    }

    /// Called periodically (or right after a `Pending` result) to check
    /// whether an ambiguous match's timeout has elapsed. Returns the
    /// committed binding if so, `None` if still waiting or idle.
    #[must_use]
    pub fn poll_timeout(&mut self) -> Option<Binding> {
        let pending = self.state.as_ref()?;
        let since = pending.ambiguous_since?;
        if since.elapsed() < self.ambiguous_timeout {
            return None;
        }
        let value = pending.last_value.clone();
        self.state = None;
        value
    }

    /// True while a partial sequence is buffered awaiting more bytes or a
    /// timeout.
    #[must_use]
    pub fn is_pending(&self) -> bool { self.state.is_some() }

    /// Raises an error for a byte that doesn't extend any binding, for
    /// callers configured to treat unmatched input as a protocol violation
    /// rather than raw data.
    pub fn reject(byte: u8) -> Result<Binding> { Err(TermError::InvalidSequence(vec![byte])) }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::super::bindings::{KeyCode, Modifiers};
    use super::*;

    fn esc_and_up_trie() -> Trie<Binding> {
        let mut trie = Trie::new();
        trie.bind(b"\x1b", Binding::Key(KeyCode::Escape, Modifiers::empty()));
        trie.bind(b"\x1b[A", Binding::Key(KeyCode::Up, Modifiers::empty()));
        trie
    }

    #[test]
    fn unambiguous_single_byte_commits_immediately() {
        let trie = Trie::new();
        let mut trie = trie;
        trie.bind(b"a", Binding::Char('a'));
        let mut reader = BindingReader::new(&trie);
        assert_eq!(reader.feed(b'a'), Decoded::Committed(Binding::Char('a')));
    }

    #[test]
    fn esc_followed_by_bracket_a_commits_to_up_without_waiting_full_timeout() {
        let trie = esc_and_up_trie();
        let mut reader = BindingReader::new(&trie).with_ambiguous_timeout(Duration::from_millis(200));
        assert_eq!(reader.feed(0x1b), Decoded::Pending);
        assert_eq!(reader.feed(b'['), Decoded::Pending);
        assert_eq!(
            reader.feed(b'A'),
            Decoded::Committed(Binding::Key(KeyCode::Up, Modifiers::empty()))
        );
    }

    #[test]
    fn esc_alone_commits_after_timeout_elapses() {
        let trie = esc_and_up_trie();
        let mut reader = BindingReader::new(&trie).with_ambiguous_timeout(Duration::from_millis(20));
        assert_eq!(reader.feed(0x1b), Decoded::Pending);
        assert!(reader.poll_timeout().is_none());
        sleep(Duration::from_millis(30));
        assert_eq!(
            reader.poll_timeout(),
            Some(Binding::Key(KeyCode::Escape, Modifiers::empty()))
        );
        assert!(!reader.is_pending());
    }

    #[test]
    fn unbound_byte_at_root_is_raw() {
        let trie = esc_and_up_trie();
        let mut reader = BindingReader::new(&trie);
        assert_eq!(reader.feed(b'z'), Decoded::Raw(b'z'));
    }
}
