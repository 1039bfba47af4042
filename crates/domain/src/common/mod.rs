//! Small pure helpers for storage adapters.

pub mod datetime;

pub use datetime::{format_datetime, parse_datetime, parse_optional_datetime};
