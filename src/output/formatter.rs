//! Output formatters for properties
//!
//! Renders property trees as an indented table or as JSON.

use std::io::Write;

use crate::models::Property;
use crate::property::render;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }

    /// Pick the explicit format, else the fallback, else table
    pub fn select(explicit: Option<&str>, fallback: Option<&str>) -> Self {
        explicit
            .or(fallback)
            .and_then(Self::from_str)
            .unwrap_or(OutputFormat::Table)
    }
}

/// Property formatter
pub struct PropertyFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl PropertyFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single property and its children
    pub fn format_property(&self, property: &Property) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                self.write_tree(property, 0, &mut output);
                output
            }
            OutputFormat::Json => serde_json::to_string(property).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(property).unwrap_or_default(),
        }
    }

    /// Format several properties, sorted by name
    pub fn format_properties<'a>(&self, properties: impl IntoIterator<Item = &'a Property>) -> String {
        let mut sorted: Vec<&Property> = properties.into_iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(&b.name()));

        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                for property in &sorted {
                    self.write_tree(property, 0, &mut output);
                }
                output.push_str(&format!("{:-<60}\n", ""));
                output.push_str(&format!("Total: {} properties\n", sorted.len()));
                output
            }
            OutputFormat::Json => serde_json::to_string(&sorted).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&sorted).unwrap_or_default(),
        }
    }

    fn write_tree(&self, property: &Property, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);
        let name = property.name().unwrap_or("<unnamed>");
        let kind = property.property_type().name();
        let kind = if self.colorize {
            format!("\x1b[36m{kind}\x1b[0m")
        } else {
            kind.to_string()
        };

        let mut line = format!("{indent}{name} ({kind})");
        if let Some(reference) = property.reference() {
            line.push_str(&format!(" -> {reference}"));
        }
        if !property.is_composite() {
            let value = render(property).unwrap_or_else(|| "null".to_string());
            line.push_str(&format!(" = {value}"));
        }
        output.push_str(&line);
        output.push('\n');

        for child in property.children() {
            self.write_tree(child.property(), depth + 1, output);
        }
    }
}

impl Default for PropertyFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a property to a file
pub fn write_property_to_file(path: &str, property: &Property, format: OutputFormat) -> anyhow::Result<()> {
    let formatter = PropertyFormatter::new(format).no_color();
    let content = formatter.format_property(property);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use crate::property::helper::{add, create_integer_property, create_property_list, create_string_property};

    fn server() -> Property {
        let mut server = create_property_list("server");
        add(create_integer_property("port", 8080), &mut server).unwrap();
        add(Property::reference_to(PropertyType::Text, "host"), &mut server).unwrap();
        server
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_output_format_select() {
        assert_eq!(OutputFormat::select(None, None), OutputFormat::Table);
        assert_eq!(OutputFormat::select(None, Some("json-pretty")), OutputFormat::JsonPretty);
        assert_eq!(OutputFormat::select(Some("json"), Some("json-pretty")), OutputFormat::Json);
        assert_eq!(OutputFormat::select(Some("csv"), Some("json")), OutputFormat::Table);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = PropertyFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_format_tree() {
        let output = PropertyFormatter::default().no_color().format_property(&server());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "server (List)");
        assert_eq!(lines[1], "  port (Integer) = 8080");
        assert_eq!(lines[2], "  <unnamed> (Text) -> host = null");
    }

    #[test]
    fn test_format_properties_sorted() {
        let b = create_string_property("b", "2");
        let a = create_string_property("a", "1");
        let output = PropertyFormatter::default()
            .no_color()
            .format_properties([&b, &a]);
        assert!(output.starts_with("a (Text) = 1\nb (Text) = 2\n"));
        assert!(output.contains("Total: 2 properties"));
    }

    #[test]
    fn test_format_json() {
        let output = PropertyFormatter::new(OutputFormat::Json).format_property(&create_integer_property("port", 1));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "port");
        assert_eq!(value["value"], 1);
    }
}
