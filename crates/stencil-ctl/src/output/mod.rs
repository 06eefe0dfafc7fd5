//! Styled terminal output for `stencil-ctl`.
//!
//! Reports go to stdout, errors to stderr. `anstream` strips the styling when
//! the stream is not a terminal, so rendered content piped elsewhere is never
//! mixed with escape codes.

mod styles;

use std::fmt::Display;
use std::io::Write;

pub(crate) use styles::clap_styles;

use styles::{FAILED, HEADER, LABEL, MUTED, NAME, OK, WARN};

pub(crate) fn header(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{HEADER}{msg}{HEADER:#}").ok();
}

/// `  label: value` with a bold label.
pub(crate) fn label(name: impl Display, value: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "  {LABEL}{name}:{LABEL:#} {value}").ok();
}

/// Bulleted id, optionally followed by muted detail.
pub(crate) fn entry(id: impl Display, detail: Option<&str>) {
    let mut out = anstream::stdout().lock();
    match detail {
        Some(detail) => writeln!(out, "  • {NAME}{id}{NAME:#} {MUTED}{detail}{MUTED:#}").ok(),
        None => writeln!(out, "  • {NAME}{id}{NAME:#}").ok(),
    };
}

/// Check result line with a green tick or red cross.
pub(crate) fn outcome(passed: bool, msg: impl Display) {
    let mut out = anstream::stdout().lock();
    if passed {
        writeln!(out, "  {OK}✓{OK:#} {msg}").ok();
    } else {
        writeln!(out, "  {FAILED}✗{FAILED:#} {msg}").ok();
    }
}

pub(crate) fn success(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{OK}✓ {msg}{OK:#}").ok();
}

pub(crate) fn warning(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{WARN}! {msg}{WARN:#}").ok();
}

pub(crate) fn error(msg: impl Display) {
    let mut out = anstream::stderr().lock();
    writeln!(out, "{FAILED}✗ {msg}{FAILED:#}").ok();
}

pub(crate) fn muted(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{MUTED}{msg}{MUTED:#}").ok();
}

pub(crate) fn blank() {
    let mut out = anstream::stdout().lock();
    writeln!(out).ok();
}
