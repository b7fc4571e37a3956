// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Platform-independent line-discipline state: the four POSIX termios flag
//! bitsets plus the control-character table, modeled the way `spec.md` §3
//! names them rather than as a thin wrapper over `rustix::termios::Termios`
//! (which only exists on Unix). `terminal::posix` and `terminal::windows_vt`
//! each translate to/from their native representation.
//!
//! Uses `bitflags` for mode flags, the same as
//! crates across the pack depend on it) and in `rustix::termios`'s own flag
//! types, which `raw_mode_unix.rs` manipulates directly.

use std::collections::HashMap;

use bitflags::bitflags;
use strum_macros::{EnumIter, EnumString};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u32 {
        const IGNBRK  = 1 << 0;
        const BRKINT  = 1 << 1;
        const INPCK   = 1 << 2;
        const ISTRIP  = 1 << 3;
        const INLCR   = 1 << 4;
        const IGNCR   = 1 << 5;
        const ICRNL   = 1 << 6;
        const IXON    = 1 << 7;
        const IXOFF   = 1 << 8;
        const IXANY   = 1 << 9;
        const IMAXBEL = 1 << 10;
        const IUTF8   = 1 << 11;
        const INORMEOL = 1 << 12;
        const PARMRK  = 1 << 13;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u32 {
        const OPOST  = 1 << 0;
        const ONLCR  = 1 << 1;
        const OCRNL  = 1 << 2;
        const ONOCR  = 1 << 3;
        const ONLRET = 1 << 4;
        const OFILL  = 1 << 5;
        const OFDEL  = 1 << 6;
        /// Delay subfields (NLDLY/CRDLY/TABDLY/BSDLY/VTDLY/FFDLY) collapsed
        /// to a single "some delay requested" bit; no host this crate
        /// targets honors the fine-grained delay values.
        const DELAY  = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlFlags: u32 {
        const CS5    = 1 << 0;
        const CS6    = 1 << 1;
        const CS7    = 1 << 2;
        const CS8    = 1 << 3;
        const CSTOPB = 1 << 4;
        const CREAD  = 1 << 5;
        const PARENB = 1 << 6;
        const PARODD = 1 << 7;
        const HUPCL  = 1 << 8;
        const CLOCAL = 1 << 9;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LocalFlags: u32 {
        const ISIG    = 1 << 0;
        const ICANON  = 1 << 1;
        const ECHO    = 1 << 2;
        const ECHOE   = 1 << 3;
        const ECHOK   = 1 << 4;
        const ECHONL  = 1 << 5;
        const ECHOCTL = 1 << 6;
        const ECHOKE  = 1 << 7;
        const ECHOPRT = 1 << 8;
        const NOFLSH  = 1 << 9;
        const TOSTOP  = 1 << 10;
        const IEXTEN  = 1 << 11;
        const EXTPROC = 1 << 12;
        const FLUSHO  = 1 << 13;
        const PENDIN  = 1 << 14;
    }
}

/// Names of the control-character slots, keyed into `Attributes::control_chars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ControlChar {
    VIntr,
    VQuit,
    VErase,
    VKill,
    VEof,
    VEol,
    VEol2,
    VStart,
    VStop,
    VSusp,
    VDsusp,
    VReprint,
    VWerase,
    VLnext,
    VDiscard,
    VMin,
    VTime,
    VStatus,
}

/// Four flag bitsets plus a control-character table: the full line-discipline
/// state of a terminal, independent of any one host's `termios` layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    pub input: InputFlags,
    pub output: OutputFlags,
    pub control: ControlFlags,
    pub local: LocalFlags,
    pub control_chars: HashMap<ControlChar, u8>,
}

impl Attributes {
    /// A conservative "cooked mode" baseline: `ICANON | ECHO | ISIG`, sane
    /// input/output post-processing, 8-bit characters.
    #[must_use]
    pub fn cooked() -> Self {
        let mut control_chars = HashMap::new();
        control_chars.insert(ControlChar::VMin, 1);
        control_chars.insert(ControlChar::VTime, 0);
        Attributes {
            input: InputFlags::ICRNL | InputFlags::IXON,
            output: OutputFlags::OPOST | OutputFlags::ONLCR,
            control: ControlFlags::CS8 | ControlFlags::CREAD,
            local: LocalFlags::ISIG | LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::IEXTEN,
            control_chars,
        }
    }

    /// Applies the raw-mode transformation spec.md §4.3 describes:
    /// `ICANON | ECHO | IEXTEN | ISIG` cleared, `VMIN=1, VTIME=0`. Returns a
    /// new value; the caller is responsible for snapshotting `self` first.
    #[must_use]
    pub fn into_raw(mut self) -> Self {
        self.input.remove(
            InputFlags::IGNBRK
                | InputFlags::BRKINT
                | InputFlags::PARMRK
                | InputFlags::ISTRIP
                | InputFlags::INLCR
                | InputFlags::IGNCR
                | InputFlags::ICRNL
                | InputFlags::IXON,
        );
        self.output.remove(OutputFlags::OPOST);
        self.local
            .remove(LocalFlags::ECHO | LocalFlags::ECHONL | LocalFlags::ICANON | LocalFlags::ISIG | LocalFlags::IEXTEN);
        self.control.remove(ControlFlags::CS5 | ControlFlags::CS6 | ControlFlags::CS7);
        self.control.insert(ControlFlags::CS8);
        self.control_chars.insert(ControlChar::VMin, 1);
        self.control_chars.insert(ControlChar::VTime, 0);
        self
    }
}
