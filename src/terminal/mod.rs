// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! The terminal abstraction: attribute model, size, signal registry, the
//! [`traits::Terminal`]/[`traits::Reader`]/[`traits::Writer`] trait triad,
//! and every concrete backend that implements it.

// Attach.
pub mod attributes;
pub mod dummy;
pub mod external_process;
pub mod line_discipline;
pub mod posix;
pub mod pty;
pub mod signal;
pub mod size;
pub mod traits;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

#[cfg(windows)]
pub mod windows_legacy;
#[cfg(windows)]
pub mod windows_vt;

// Re-export.
pub use attributes::*;
pub use dummy::DummyTerminal;
pub use external_process::SttyTerminal;
pub use line_discipline::LineDisciplineTerminal;
pub use posix::PosixTerminal;
pub use pty::PtyTerminal;
pub use signal::*;
pub use size::*;
pub use traits::*;

#[cfg(any(test, feature = "test-fixtures"))]
pub use test_fixtures::{MockDuplex, StubTerminal};

#[cfg(windows)]
pub use windows_legacy::WindowsLegacyTerminal;
#[cfg(windows)]
pub use windows_vt::WindowsVtTerminal;
