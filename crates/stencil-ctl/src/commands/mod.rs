//! Command handlers for `stencil-ctl`.

mod check;
mod inspect;
mod render;

pub(crate) use check::handle_check_command;
pub(crate) use inspect::handle_inspect_command;
pub(crate) use render::{handle_render_command, RenderRequest};
