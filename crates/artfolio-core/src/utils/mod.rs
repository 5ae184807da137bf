//! Utility functions for string formatting.

pub mod format;

pub use format::{format_date, format_optional_date, truncate_string};
