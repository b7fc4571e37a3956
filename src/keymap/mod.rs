// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Key/mouse binding trie and the ambiguity-timeout reader that decodes raw
//! input bytes against it (`spec.md` §3 "Key binding trie", §4.2).

// Attach.
mod bindings;
mod reader;
mod trie;

// Re-export.
pub use bindings::{decode_bracketed_paste, decode_x10_mouse, default_bindings, Binding, KeyCode, Modifiers, MouseButton, MouseEvent};
pub use reader::{BindingReader, Decoded, DEFAULT_AMBIGUOUS_TIMEOUT};
pub use trie::{Step, Trie, Walk};
