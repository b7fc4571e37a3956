// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Signal registration shared by every terminal variant.
//!
//! Built on the same unix-only `signal-hook`/`signal-hook-mio`
//! dependency pair (added for `SIGWINCH` on its direct-to-ANSI backend) and
//! in `spec.md` §9's "wrap each registration in a scoped token" design
//! note: [`SignalToken`] unregisters on drop instead of leaving a dangling
//! OS-level handler, and [`crate::terminal::Terminal::close`] is expected
//! to drop every token it holds in reverse registration order.

use std::fmt;
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

/// The signals every terminal variant may register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Int,
    Quit,
    Tstp,
    Cont,
    Winch,
    Info,
}

/// What to do when a signal with no custom handler arrives.
#[derive(Clone)]
pub enum Handler {
    /// Run the host's default disposition (`SIG_DFL`).
    Default,
    /// Ignore the signal (`SIG_IGN`).
    Ignore,
    /// Invoke a closure on the scheduling policy spec.md §4.8 describes for
    /// this terminal variant (synchronous signal thread on POSIX, posted
    /// event on the Windows input pump, inline on the line-discipline
    /// emulator's feeding thread).
    Custom(Arc<dyn Fn(Signal) + Send + Sync>),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Default => f.write_str("Handler::Default"),
            Handler::Ignore => f.write_str("Handler::Ignore"),
            Handler::Custom(_) => f.write_str("Handler::Custom(..)"),
        }
    }
}

/// Per-terminal table mapping a [`Signal`] to its currently installed
/// [`Handler`]. A `RwLock` over an `FxHashMap` rather than a true lock-free
/// structure (the pack has no lock-free map dependency); contention is
/// negligible since `handle()` is called rarely and dispatch only takes the
/// read side.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    handlers: RwLock<FxHashMap<Signal, Handler>>,
}

impl SignalRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Install `handler` for `signal`, returning the previous handler (or
    /// [`Handler::Default`] if none was installed).
    pub fn install(&self, signal: Signal, handler: Handler) -> Handler {
        let mut map = self.handlers.write().expect("signal registry lock poisoned");
        map.insert(signal, handler).unwrap_or(Handler::Default)
    }

    /// Invoke the handler installed for `signal`, if it is [`Handler::Custom`].
    pub fn dispatch(&self, signal: Signal) {
        let handler = {
            let map = self.handlers.read().expect("signal registry lock poisoned");
            map.get(&signal).cloned()
        };
        if let Some(Handler::Custom(f)) = handler {
            f(signal);
        }
    }

    fn get(&self, signal: Signal) -> Option<Handler> {
        self.handlers.read().expect("signal registry lock poisoned").get(&signal).cloned()
    }
}

impl Clone for Handler {
    fn clone(&self) -> Self {
        match self {
            Handler::Default => Handler::Default,
            Handler::Ignore => Handler::Ignore,
            Handler::Custom(f) => Handler::Custom(Arc::clone(f)),
        }
    }
}

/// A scoped OS-level signal registration. Dropping the token unregisters
/// the handler; terminals accumulate one token per signal they registered
/// at `open()` and drop them all, in reverse order, inside `close()`.
#[cfg(unix)]
pub struct SignalToken {
    id: signal_hook::SigId,
}

#[cfg(unix)]
impl fmt::Debug for SignalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalToken").field("id", &self.id).finish()
    }
}

#[cfg(unix)]
impl SignalToken {
    /// Register a low-level action to run on `signal`'s raise, returning a
    /// token that unregisters it on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the registration (e.g. the
    /// signal number is not one `signal-hook` permits intercepting).
    pub fn register(
        signal: Signal,
        action: impl Fn() + Sync + Send + 'static,
    ) -> std::io::Result<Self> {
        let raw = raw_signal_number(signal);
        let id = unsafe { signal_hook::low_level::register(raw, action) }?;
        Ok(SignalToken { id })
    }
}

#[cfg(unix)]
impl Drop for SignalToken {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.id);
    }
}

#[cfg(unix)]
fn raw_signal_number(signal: Signal) -> i32 {
    match signal {
        Signal::Int => signal_hook::consts::SIGINT,
        Signal::Quit => signal_hook::consts::SIGQUIT,
        Signal::Tstp => signal_hook::consts::SIGTSTP,
        Signal::Cont => signal_hook::consts::SIGCONT,
        Signal::Winch => signal_hook::consts::SIGWINCH,
        // SIGINFO only exists on BSD-family kernels (including macOS); Linux
        // has no equivalent, so `Signal::Info` maps to SIGUSR1 there, same
        // fallback `stty status`-style tools use.
        #[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd", target_os = "dragonfly"))]
        Signal::Info => signal_hook::consts::SIGINFO,
        #[cfg(not(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd", target_os = "dragonfly")))]
        Signal::Info => signal_hook::consts::SIGUSR1,
    }
}

/// On Windows there is no signal facility; registration is a no-op token
/// held only so call sites don't need `#[cfg]` gymnastics. The input pump
/// posts synthetic `Signal::Winch`/`Signal::Int` events directly into a
/// [`SignalRegistry`] instead.
#[cfg(windows)]
#[derive(Debug)]
pub struct SignalToken;

#[cfg(windows)]
impl SignalToken {
    pub fn register(_signal: Signal, _action: impl Fn() + Sync + Send + 'static) -> std::io::Result<Self> {
        Ok(SignalToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_defaults_to_default_handler() {
        let reg = SignalRegistry::new();
        assert!(reg.get(Signal::Winch).is_none());
    }

    #[test]
    fn install_returns_previous_handler() {
        let reg = SignalRegistry::new();
        let prev = reg.install(Signal::Int, Handler::Ignore);
        assert!(matches!(prev, Handler::Default));
        let prev2 = reg.install(Signal::Int, Handler::Default);
        assert!(matches!(prev2, Handler::Ignore));
    }

    #[test]
    fn dispatch_invokes_custom_handler() {
        let reg = SignalRegistry::new();
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        reg.install(Signal::Winch, Handler::Custom(Arc::new(move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        })));
        reg.dispatch(Signal::Winch);
        assert!(called.load(std::sync::atomic::Ordering::SeqCst));
    }
}
