//! UI helpers for consistent CLI output
//!
//! Uses `cliclack` for interactive terminals with automatic fallback to
//! plain output in CI/non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{intro, key_value, step_info, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
