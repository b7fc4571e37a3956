// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! Embedded terminfo-equivalent entries for the small set of terminal types
//! `spec.md` §4.1 names as the baseline: `xterm-256color`, `xterm`,
//! `screen-256color`, `tmux-256color`, `vt100`, `dumb`.
//!
//! Capability string values match the well-known xterm/screen/vt100
//! terminfo source definitions directly; nothing upstream ships a terminfo
//! database to copy from.

use super::database::Table;

fn common_cursor_moves(table: Table) -> Table {
    table
        .with_string("cup", "\x1b[%i%p1%d;%p2%dH")
        .with_string("cuu1", "\x1b[A")
        .with_string("cud1", "\n")
        .with_string("cuf1", "\x1b[C")
        .with_string("cub1", "\x08")
        .with_string("cuu", "\x1b[%p1%dA")
        .with_string("cud", "\x1b[%p1%dB")
        .with_string("cuf", "\x1b[%p1%dC")
        .with_string("cub", "\x1b[%p1%dD")
        .with_string("home", "\x1b[H")
        .with_string("cr", "\r")
        .with_string("ht", "\t")
}

fn common_erase(table: Table) -> Table {
    table
        .with_string("clear", "\x1b[H\x1b[2J")
        .with_string("el", "\x1b[K")
        .with_string("el1", "\x1b[1K")
        .with_string("ed", "\x1b[J")
}

fn common_editing(table: Table) -> Table {
    table
        .with_string("ich1", "\x1b[@")
        .with_string("dch1", "\x1b[P")
        .with_string("il1", "\x1b[L")
        .with_string("dl1", "\x1b[M")
        .with_string("ich", "\x1b[%p1%d@")
        .with_string("dch", "\x1b[%p1%dP")
}

fn common_sgr(table: Table) -> Table {
    table
        .with_string("bold", "\x1b[1m")
        .with_string("dim", "\x1b[2m")
        .with_string("smul", "\x1b[4m")
        .with_string("rmul", "\x1b[24m")
        .with_string("blink", "\x1b[5m")
        .with_string("rev", "\x1b[7m")
        .with_string("sgr0", "\x1b[0m")
        .with_string("setaf", "\x1b[3%p1%dm")
        .with_string("setab", "\x1b[4%p1%dm")
        .with_string("civis", "\x1b[?25l")
        .with_string("cnorm", "\x1b[?25h")
}

fn common_alt_screen(table: Table) -> Table {
    table.with_string("smcup", "\x1b[?1049h").with_string("rmcup", "\x1b[?1049l")
}

fn common_keys(table: Table) -> Table {
    table
        .with_string("kcuu1", "\x1b[A")
        .with_string("kcud1", "\x1b[B")
        .with_string("kcuf1", "\x1b[C")
        .with_string("kcub1", "\x1b[D")
        .with_string("khome", "\x1b[H")
        .with_string("kend", "\x1b[F")
        .with_string("kpp", "\x1b[5~")
        .with_string("knp", "\x1b[6~")
        .with_string("kich1", "\x1b[2~")
        .with_string("kdch1", "\x1b[3~")
        .with_string("kf1", "\x1bOP")
        .with_string("kf2", "\x1bOQ")
        .with_string("kf3", "\x1bOR")
        .with_string("kf4", "\x1bOS")
        .with_string("kf5", "\x1b[15~")
        .with_string("kf6", "\x1b[17~")
        .with_string("kf7", "\x1b[18~")
        .with_string("kf8", "\x1b[19~")
        .with_string("kf9", "\x1b[20~")
        .with_string("kf10", "\x1b[21~")
        .with_string("kf11", "\x1b[23~")
        .with_string("kf12", "\x1b[24~")
}

fn xterm_256color() -> Table {
    let table = Table::new("xterm-256color").with_flag("am", true).with_num("colors", 256).with_num("pairs", 32767);
    common_keys(common_alt_screen(common_sgr(common_editing(common_erase(common_cursor_moves(table))))))
}

fn xterm() -> Table {
    let table = Table::new("xterm").with_flag("am", true).with_num("colors", 8).with_num("pairs", 64);
    let table = common_keys(common_alt_screen(common_sgr(common_editing(common_erase(common_cursor_moves(table))))));
    table.with_string("setaf", "\x1b[3%p1%dm").with_string("setab", "\x1b[4%p1%dm")
}

fn screen_256color() -> Table {
    let table =
        Table::new("screen-256color").with_flag("am", true).with_num("colors", 256).with_num("pairs", 32767);
    // `screen` lacks a dedicated alternate-screen save/restore pair distinct
    // from xterm's; it forwards DECSET 1049 through to the outer terminal.
    common_keys(common_alt_screen(common_sgr(common_editing(common_erase(common_cursor_moves(table))))))
}

fn tmux_256color() -> Table {
    let table =
        Table::new("tmux-256color").with_flag("am", true).with_num("colors", 256).with_num("pairs", 32767);
    common_keys(common_alt_screen(common_sgr(common_editing(common_erase(common_cursor_moves(table))))))
}

fn vt100() -> Table {
    // vt100 has no SGR color support and no alternate screen; erase/cursor
    // addressing use the same ANSI CSI forms xterm inherited from it.
    let table = Table::new("vt100").with_flag("am", true).with_num("colors", 0).with_num("pairs", 0);
    let table = common_editing(common_erase(common_cursor_moves(table)));
    table
        .with_string("bold", "\x1b[1m")
        .with_string("smul", "\x1b[4m")
        .with_string("rmul", "\x1b[m")
        .with_string("sgr0", "\x1b[m")
        .with_string("kcuu1", "\x1bOA")
        .with_string("kcud1", "\x1bOB")
        .with_string("kcuf1", "\x1bOC")
        .with_string("kcub1", "\x1bOD")
}

fn dumb() -> Table {
    // `dumb` has no escape-sequence capabilities at all; every string
    // capability lookup correctly fails with `CapabilityAbsent`.
    Table::new("dumb").with_flag("am", true).with_num("colors", 0).with_num("pairs", 0)
}

#[must_use]
pub fn embedded_tables() -> Vec<Table> { vec![xterm_256color(), xterm(), screen_256color(), tmux_256color(), vt100(), dumb()] }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumb_has_no_string_capabilities() {
        let table = dumb();
        assert!(table.get_string("cup").is_err());
    }

    #[test]
    fn xterm_256color_reports_256_colors() {
        assert_eq!(xterm_256color().get_num("colors").unwrap(), 256);
    }
}
