//! Palette for terminal output and clap help.

use anstyle::{AnsiColor, Color, Effects, Style};

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub(crate) const OK: Style = fg(AnsiColor::Green);
pub(crate) const FAILED: Style = fg(AnsiColor::Red);
pub(crate) const WARN: Style = fg(AnsiColor::Yellow);
pub(crate) const NAME: Style = fg(AnsiColor::Cyan);
pub(crate) const HEADER: Style = Style::new().effects(Effects::BOLD);
pub(crate) const LABEL: Style = Style::new().effects(Effects::BOLD);
pub(crate) const MUTED: Style = Style::new().effects(Effects::DIMMED);

pub(crate) fn clap_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(fg(AnsiColor::Green).effects(Effects::BOLD))
        .usage(fg(AnsiColor::Green).effects(Effects::BOLD))
        .literal(NAME)
        .placeholder(NAME)
        .error(FAILED.effects(Effects::BOLD))
        .valid(OK)
        .invalid(WARN)
}
