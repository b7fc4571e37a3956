// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Styled text: colors, per-character attributes, and the immutable
//! attributed-string type the output pipeline serializes.

// Attach.
pub mod attributed_string;
pub mod color;
pub mod style;
pub mod width;

// Re-export.
pub use attributed_string::*;
pub use color::*;
pub use style::*;
pub use width::*;
