//! Terminal output for the admin commands
//!
//! Uses `cliclack` when attached to a terminal and falls back to plain,
//! bracket-prefixed lines in CI or when piped.

mod context;
mod output;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, remark, step_error_detail, step_info,
    step_ok, step_ok_detail, step_warn, step_warn_hint,
};
pub use prompts::{confirm, password};
pub use theme::{init_theme, QuireTheme};
