// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The capability database and parameterized-string evaluator
//! (`spec.md` §4.1): resolves a terminal type name to a table of
//! boolean/numeric/string capabilities and evaluates `%`-directive
//! templates into concrete byte sequences.

// Attach.
mod database;
mod entries;
pub mod tputs;

// Re-export.
pub use database::{Database, Table};
pub use tputs::Param;
