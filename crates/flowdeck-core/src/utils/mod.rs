//! Utility functions for string formatting.

pub mod format;

pub use format::{format_date, short_id, truncate_string};
