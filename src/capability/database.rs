// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The capability table (`InfoCmp` in `spec.md` prose) and the database
//! that resolves a terminal type name to one.
//!
//! No sibling module here implements a terminfo database; the three-map shape
//! (boolean/numeric/string keyed by a fixed capability-name enumeration)
//! follows `spec.md` §3 "Capability table" directly. Embedded entries match
//! the well-known xterm/screen/vt100 terminfo source definitions.

use std::collections::HashMap;

use crate::error::{Result, TermError};

use super::tputs::{self, Param};

/// A single terminal type's resolved capability set. Keys are terminfo
/// short names (`"cup"`, `"el"`, `"colors"`) rather than a closed Rust enum,
/// so [`Database::load_external`] can add capabilities this crate's
/// embedded set doesn't enumerate without a breaking type change.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub aliases: Vec<String>,
    flags: HashMap<&'static str, bool>,
    nums: HashMap<&'static str, i64>,
    strings: HashMap<&'static str, String>,
}

impl Table {
    #[must_use]
    pub fn new(name: &str) -> Self { Table { name: name.to_owned(), ..Table::default() } }

    #[must_use]
    pub fn with_flag(mut self, cap: &'static str, value: bool) -> Self {
        self.flags.insert(cap, value);
        self
    }

    #[must_use]
    pub fn with_num(mut self, cap: &'static str, value: i64) -> Self {
        self.nums.insert(cap, value);
        self
    }

    #[must_use]
    pub fn with_string(mut self, cap: &'static str, value: impl Into<String>) -> Self {
        self.strings.insert(cap, value.into());
        self
    }

    /// # Errors
    /// Returns [`TermError::CapabilityAbsent`] if `cap` isn't present.
    pub fn get_flag(&self, cap: &str) -> Result<bool> {
        self.flags.get(cap).copied().ok_or_else(|| absent(cap))
    }

    /// # Errors
    /// Returns [`TermError::CapabilityAbsent`] if `cap` isn't present.
    pub fn get_num(&self, cap: &str) -> Result<i64> { self.nums.get(cap).copied().ok_or_else(|| absent(cap)) }

    /// # Errors
    /// Returns [`TermError::CapabilityAbsent`] if `cap` isn't present.
    pub fn get_string(&self, cap: &str) -> Result<&str> {
        self.strings.get(cap).map(String::as_str).ok_or_else(|| absent(cap))
    }

    /// Resolves and evaluates a string capability against `params`, per
    /// `spec.md` §4.1's `tputs(sink, capability_string, params...)`.
    ///
    /// # Errors
    /// Propagates [`TermError::CapabilityAbsent`] if `cap` is missing, or
    /// [`TermError::EvaluationFailure`] if its template is malformed.
    pub fn tputs(&self, cap: &str, params: &[Param]) -> Result<Vec<u8>> {
        let template = self.get_string(cap)?;
        let stripped = tputs::strip_padding_directives(template);
        let mut out = Vec::new();
        tputs::evaluate(&stripped, params, &mut out)?;
        Ok(out)
    }
}

fn absent(cap: &str) -> TermError { TermError::CapabilityAbsent(cap.to_owned()) }

/// Resolves terminal type names to [`Table`]s.
#[derive(Debug, Clone)]
pub struct Database {
    entries: HashMap<String, Table>,
}

impl Database {
    /// The embedded set: `xterm-256color`, `xterm`, `screen-256color`,
    /// `tmux-256color`, `vt100`, `dumb` — enough to exercise every
    /// invariant in `spec.md` §8 without a system terminfo database.
    #[must_use]
    pub fn embedded() -> Self {
        let mut entries = HashMap::new();
        for table in super::entries::embedded_tables() {
            for alias in std::iter::once(table.name.clone()).chain(table.aliases.iter().cloned()) {
                entries.insert(alias, table.clone());
            }
        }
        Database { entries }
    }

    /// # Errors
    /// Returns [`TermError::CapabilityAbsent`] if `name` resolves to
    /// nothing, either in the embedded set or any table previously added
    /// via [`Database::insert`].
    pub fn lookup(&self, name: &str) -> Result<&Table> {
        self.entries.get(name).ok_or_else(|| TermError::CapabilityAbsent(name.to_owned()))
    }

    pub fn insert(&mut self, table: Table) {
        for alias in std::iter::once(table.name.clone()).chain(table.aliases.iter().cloned()) {
            self.entries.insert(alias, table.clone());
        }
    }

    /// Attempts to resolve `name` from `TERMINFO`/`TERMINFO_DIRS`-provided
    /// entries. This crate carries no compiled-terminfo-format parser (the
    /// embedded set covers every type `spec.md` §8's scenarios exercise);
    /// callers on a host with a real terminfo database should prefer a
    /// dedicated parsing crate and feed the result to [`Database::insert`].
    /// Never panics; an unresolvable name is reported as
    /// [`TermError::CapabilityAbsent`], not a hard failure.
    ///
    /// # Errors
    /// Always returns [`TermError::CapabilityAbsent`] in this
    /// implementation.
    pub fn load_external(&self, name: &str) -> Result<Table> { Err(TermError::CapabilityAbsent(name.to_owned())) }
}

impl Default for Database {
    fn default() -> Self { Self::embedded() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_xterm_256color_resolves() {
        let db = Database::embedded();
        let table = db.lookup("xterm-256color").unwrap();
        assert_eq!(table.get_num("colors").unwrap(), 256);
    }

    #[test]
    fn missing_entry_is_capability_absent() {
        let db = Database::embedded();
        assert!(matches!(db.lookup("does-not-exist"), Err(TermError::CapabilityAbsent(_))));
    }

    #[test]
    fn tputs_evaluates_cursor_address() {
        let db = Database::embedded();
        let table = db.lookup("xterm-256color").unwrap();
        let bytes = table.tputs("cup", &[Param::Int(4), Param::Int(9)]).unwrap();
        assert_eq!(bytes, b"\x1b[5;10H");
    }
}
