//! Output formatting for analysis results.

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::format_outcome;
