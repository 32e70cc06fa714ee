//! Environment variable configuration
//!
//! Provides `TESTRUN_CTX_*` overrides for the engine configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TESTRUN_CTX";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from TESTRUN_CTX_CONFIG
    pub config_file: Option<String>,
    /// Tracing flag from TESTRUN_CTX_TRACING
    pub tracing: Option<bool>,
    /// Log level from TESTRUN_CTX_LOG_LEVEL
    pub log_level: Option<String>,
    /// Output format from TESTRUN_CTX_FORMAT, used when `--format` is absent
    pub format: Option<String>,
    pub brand: Option<String>,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub username: Option<String>,
    pub notice: Option<String>,
    pub email: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            config_file: get_env("CONFIG"),
            tracing: get_env_bool("TRACING"),
            log_level: get_env("LOG_LEVEL"),
            format: get_env("FORMAT"),
            brand: get_env("BRAND"),
            release: get_env("RELEASE"),
            environment: get_env("ENVIRONMENT"),
            username: get_env("USERNAME"),
            notice: get_env("NOTICE"),
            email: get_env("EMAIL"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.config_file.is_some()
            || self.tracing.is_some()
            || self.log_level.is_some()
            || self.format.is_some()
            || self.brand.is_some()
            || self.release.is_some()
            || self.environment.is_some()
            || self.username.is_some()
            || self.notice.is_some()
            || self.email.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_TRACING:     {:?}", ENV_PREFIX, self.tracing);
        println!("  {}_LOG_LEVEL:   {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_FORMAT:      {:?}", ENV_PREFIX, self.format);
        println!("  {}_BRAND:       {:?}", ENV_PREFIX, self.brand);
        println!("  {}_RELEASE:     {:?}", ENV_PREFIX, self.release);
        println!("  {}_ENVIRONMENT: {:?}", ENV_PREFIX, self.environment);
        println!("  {}_USERNAME:    {:?}", ENV_PREFIX, self.username);
        println!("  {}_NOTICE:      {:?}", ENV_PREFIX, self.notice);
        println!("  {}_EMAIL:       {:?}", ENV_PREFIX, self.email);
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    /// Set the configuration file path
    pub fn config_file(self, path: impl Into<String>) -> Self {
        self.var("CONFIG", path)
    }

    /// Set the run-wide tracing flag
    pub fn tracing(self, tracing: bool) -> Self {
        self.var("TRACING", tracing.to_string())
    }

    /// Set the log level
    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.var("LOG_LEVEL", level)
    }

    /// Set the fallback output format
    pub fn format(self, format: impl Into<String>) -> Self {
        self.var("FORMAT", format)
    }

    /// Set the global brand
    pub fn brand(self, brand: impl Into<String>) -> Self {
        self.var("BRAND", brand)
    }

    /// Set the global release
    pub fn release(self, release: impl Into<String>) -> Self {
        self.var("RELEASE", release)
    }

    /// Set the global username
    pub fn username(self, username: impl Into<String>) -> Self {
        self.var("USERNAME", username)
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all TESTRUN_CTX environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_CONFIG        Path to configuration file");
    println!("  {ENV_PREFIX}_TRACING       Enable run-wide tracing (true/false)");
    println!("  {ENV_PREFIX}_LOG_LEVEL     Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_FORMAT        Output format (table, json, json-pretty)");
    println!("  {ENV_PREFIX}_BRAND         Global brand property");
    println!("  {ENV_PREFIX}_RELEASE       Global release property");
    println!("  {ENV_PREFIX}_ENVIRONMENT   Global environment property");
    println!("  {ENV_PREFIX}_USERNAME      Global username property");
    println!("  {ENV_PREFIX}_NOTICE        Global notice property");
    println!("  {ENV_PREFIX}_EMAIL         Global email property");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_RELEASE=4.2");
    println!("  testrun-ctx lookup --file run.yaml --path server.port");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.brand.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .brand("Acme")
            .release("4.2")
            .username("tester")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.brand, Some("Acme".to_string()));
        assert_eq!(config.release, Some("4.2".to_string()));
        assert_eq!(config.username, Some("tester".to_string()));
        assert!(config.has_any());
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = EnvBuilder::new().tracing(true).apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.tracing, Some(true));
    }

    #[test]
    fn test_env_format_is_output_fallback() {
        use crate::output::OutputFormat;

        let _guard = EnvBuilder::new().format("json").apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.format, Some("json".to_string()));
        assert_eq!(
            OutputFormat::select(None, config.format.as_deref()),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::select(Some("table"), config.format.as_deref()),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_env_guard_restores() {
        let key = format!("{ENV_PREFIX}_LOG_LEVEL");
        {
            let _guard = EnvBuilder::new().log_level("trace").apply_scoped();
            assert_eq!(env::var(&key).ok(), Some("trace".to_string()));
        }
        assert!(env::var(&key).is_err());
    }
}
