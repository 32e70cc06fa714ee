//! Configuration module
//!
//! Engine settings and the global properties seeded into every context.
//! Loaded from YAML or JSON, then overridden from the environment.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::Property;
use crate::property::helper::create_string_property;

pub use env::EnvConfig;

/// Config file locations searched in order
const CONFIG_LOCATIONS: &[&str] = &[
    "./testrun-ctx.yaml",
    "./testrun-ctx.yml",
    "./testrun-ctx.json",
    "./.testrun-ctx/config.yaml",
    "~/.config/testrun-ctx/config.yaml",
    "~/.testrun-ctx.yaml",
];

/// Engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run-wide diagnostic tracing flag
    pub tracing: bool,

    /// Log level name (trace, debug, info, warn, error)
    pub log_level: Option<String>,

    /// Global run properties
    pub globals: GlobalProperties,
}

/// Well-known global run properties
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalProperties {
    pub brand: Option<String>,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub username: Option<String>,
    pub notice: Option<String>,
    pub email: Option<String>,
}

impl GlobalProperties {
    /// Text properties for each set value, named with the `global_` keys
    ///
    /// Values are trimmed; blank values are skipped.
    pub fn to_properties(&self) -> Vec<Property> {
        use crate::context::{BRAND, EMAIL, ENVIRONMENT, NOTICE, RELEASE, USERNAME};

        [
            (BRAND, &self.brand),
            (RELEASE, &self.release),
            (ENVIRONMENT, &self.environment),
            (USERNAME, &self.username),
            (NOTICE, &self.notice),
            (EMAIL, &self.email),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| create_string_property(name, value))
        })
        .collect()
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Find the first existing config file in the standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from an explicit path, the environment, or the standard locations
    ///
    /// Falls back to defaults when no file exists. Environment overrides are
    /// applied last.
    pub fn load_default(path: Option<&Path>) -> Result<Self> {
        let env = EnvConfig::load();
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_deref().map(expand_path))
            .or_else(Self::find);

        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(&env);
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(tracing) = env.tracing {
            self.tracing = tracing;
        }
        if let Some(level) = &env.log_level {
            self.log_level = Some(level.clone());
        }

        let globals = &mut self.globals;
        for (slot, value) in [
            (&mut globals.brand, &env.brand),
            (&mut globals.release, &env.release),
            (&mut globals.environment, &env.environment),
            (&mut globals.username, &env.username),
            (&mut globals.notice, &env.notice),
            (&mut globals.email, &env.email),
        ] {
            if let Some(value) = value {
                *slot = Some(value.trim().to_string());
            }
        }
    }
}

/// Expand `~/` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
