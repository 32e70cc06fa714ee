//! Property snapshots
//!
//! A snapshot is a sequence of top-level properties stored as YAML or JSON.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::context::TestContext;
use crate::models::Property;

/// Read the properties of a snapshot file
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Property>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let properties: Vec<Property> = if is_yaml_file(path) {
        serde_yaml::from_str(&content).context("Failed to parse YAML snapshot")?
    } else {
        serde_json::from_str(&content).context("Failed to parse JSON snapshot")?
    };

    debug!("Loaded {} properties from {}", properties.len(), path.display());
    Ok(properties)
}

/// Write properties to a snapshot file
pub fn save(path: impl AsRef<Path>, properties: &[Property]) -> Result<()> {
    let path = path.as_ref();
    let content = if is_yaml_file(path) {
        serde_yaml::to_string(properties).context("Failed to serialize snapshot")?
    } else {
        serde_json::to_string_pretty(properties).context("Failed to serialize snapshot")?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    Ok(())
}

/// Merge every property of a snapshot file into a context
pub fn load_into(path: impl AsRef<Path>, context: &mut TestContext) -> Result<usize> {
    let properties = load(path)?;
    let count = properties.len();
    for property in properties {
        context.merge(property);
    }
    Ok(count)
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
