//! Output formatting module
//!
//! Table and JSON renderings of properties.

mod formatter;

pub use formatter::{write_property_to_file, OutputFormat, PropertyFormatter};
