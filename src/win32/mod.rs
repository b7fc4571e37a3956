// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Windows-only: `INPUT_RECORD` decoding and the legacy-console
//! ANSI-to-API translator.

#![cfg(windows)]

// Attach.
pub mod ansi_translator;
pub mod console_api;
pub mod input_decoder;

// Re-export.
pub use ansi_translator::*;
pub use console_api::*;
pub use input_decoder::*;
