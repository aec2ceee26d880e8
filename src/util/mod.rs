//! Utility functions.

pub mod env;
pub mod format;

pub use format::{format_context, format_cost, format_price, format_tokens, yes_no};
