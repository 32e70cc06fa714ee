//! Property algorithms
//!
//! Typed construction, name lookup, projections and reference copying.

pub mod helper;

pub use helper::{native_value, render, DEFAULT_DATE_PATTERN};
