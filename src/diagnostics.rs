// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Tracing setup shared by every terminal backend.
//!
//! Mirrors the `r3bl_log` / `core::log` crates: a
//! non-blocking file appender plus an `EnvFilter` read from an environment
//! variable, rather than `env_logger`-style stderr output (stderr is often
//! the terminal itself, which would corrupt the very screen this crate is
//! trying to render).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the tracing filter directive, e.g.
/// `termcraft=debug,termcraft::win32=trace`.
pub const LOG_ENV_VAR: &str = "TERMCRAFT_LOG";

/// Initialize a process-wide tracing subscriber that writes to `dir/file`
/// instead of stdout/stderr.
///
/// Returns a [`WorkerGuard`] that must be kept alive for the duration of the
/// process; dropping it stops the background flush thread.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_file_tracing(
    dir: impl AsRef<Path>,
    file_name_prefix: &str,
) -> Result<WorkerGuard, tracing::subscriber::SetGlobalDefaultError> {
    let file_appender = tracing_appender::rolling::never(dir, file_name_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
