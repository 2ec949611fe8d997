//! Configuration loading — TOML file with environment variable overrides.
//!
//! Only the database section is mandatory; every other field has a default.
//! Environment variables take precedence over file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::registry::DuplicatePolicy;
use crate::routes::has_capture;

/// Router adapter used when the file does not pick one.
pub const DEFAULT_ROUTER: &str = "axum";
/// Theme adapter used when the file does not pick one.
pub const DEFAULT_THEME: &str = "plain";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the router adapter.
    pub router: String,
    /// Name of the theme adapter.
    pub theme: String,
    /// Model names the application generates tables for.
    pub tables: Vec<String>,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub uploads: Option<UploadsConfig>,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
    /// Feature flags; see [`Config::feature`].
    pub features: BTreeMap<String, bool>,
}

/// Database adapter selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Name of the database adapter (e.g. `sqlite`).
    pub driver: String,
    /// Connection target, passed verbatim to the adapter.
    pub dsn: String,
}

/// HTTP listener and admin surface settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Default `host:port` for [`Engine::start`](crate::engine::Engine::start).
    pub listen: String,
    /// URL prefix of the admin surface.
    pub prefix: String,
    /// How long in-flight requests may run after shutdown begins.
    pub drain_timeout_secs: u64,
}

/// Static mount for uploaded assets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadsConfig {
    #[serde(default = "UploadsConfig::default_mount")]
    pub mount: String,
    pub dir: PathBuf,
}

/// Duplicate registration policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Later registrations under an existing name replace the earlier one.
    pub allow_override: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the TOML file at `path`, then apply
    /// environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing,
    /// [`ConfigError::Malformed`] if it is not valid TOML for this schema and
    /// [`ConfigError::Invalid`] if a required field is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_env_overrides();
        config.fill_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate an in-memory TOML document, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Malformed)?;
        config.fill_defaults();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Malformed),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ADMINKIT_DATABASE_DRIVER") {
            self.database.driver = val;
        }
        if let Ok(val) = std::env::var("ADMINKIT_DATABASE_DSN") {
            self.database.dsn = val;
        }
        if let Ok(val) = std::env::var("ADMINKIT_LISTEN") {
            self.server.listen = val;
        }
        if let Ok(val) = std::env::var("ADMINKIT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn fill_defaults(&mut self) {
        if self.router.trim().is_empty() {
            self.router = DEFAULT_ROUTER.to_string();
        }
        if self.theme.trim().is_empty() {
            self.theme = DEFAULT_THEME.to_string();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.driver.trim().is_empty() {
            return Err(ConfigError::Invalid("database.driver is required".to_string()));
        }
        if self.database.dsn.trim().is_empty() {
            return Err(ConfigError::Invalid("database.dsn is required".to_string()));
        }
        if !self.server.prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "server.prefix must start with '/'".to_string(),
            ));
        }
        if has_capture(&self.server.prefix) {
            return Err(ConfigError::Invalid(
                "server.prefix must not contain capture or wildcard segments".to_string(),
            ));
        }
        if self.server.drain_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.drain_timeout_secs must be non-zero".to_string(),
            ));
        }
        if let Some(uploads) = &self.uploads {
            let mount = uploads.mount.trim_end_matches('/');
            if !uploads.mount.starts_with('/') || mount.is_empty() {
                return Err(ConfigError::Invalid(
                    "uploads.mount must be an absolute path below '/'".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Look up a feature flag, falling back to the built-in default.
    ///
    /// Known flags: `export` (default on) keeps the export action on every
    /// table, `request_tracing` (default on) wraps the router in a trace layer.
    /// Unknown flags default to off.
    #[must_use]
    pub fn feature(&self, name: &str) -> bool {
        self.features
            .get(name)
            .copied()
            .unwrap_or(matches!(name, "export" | "request_tracing"))
    }

    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.server.drain_timeout_secs)
    }

    /// Duplicate registration policy for both registries.
    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.registry.allow_override {
            DuplicatePolicy::Override
        } else {
            DuplicatePolicy::Reject
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            prefix: "/admin".to_string(),
            drain_timeout_secs: 10,
        }
    }
}

impl UploadsConfig {
    fn default_mount() -> String {
        "/uploads".to_string()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            allow_override: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "adminkitd=info,adminkit=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file {} not found", .0.display())]
    NotFound(PathBuf),
    /// TOML syntax or schema failure.
    #[error("malformed config file")]
    Malformed(#[source] toml::de::Error),
    /// A required field is missing or a value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// File I/O failure other than "not found".
    #[error("failed to read config file")]
    Io(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
        [database]
        driver = 'sqlite'
        dsn = './test.db'
    ";

    #[test]
    fn should_apply_defaults_to_minimal_document() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.router, DEFAULT_ROUTER);
        assert_eq!(config.theme, DEFAULT_THEME);
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.server.prefix, "/admin");
        assert_eq!(config.drain_timeout(), Duration::from_secs(10));
        assert!(config.registry.allow_override);
        assert!(config.uploads.is_none());
        assert!(config.tables.is_empty());
    }

    #[test]
    fn should_parse_full_document() {
        let toml = "
            router = 'axum'
            theme = 'plain'
            tables = ['users', 'orders']

            [database]
            driver = 'sqlite'
            dsn = 'sqlite::memory:'

            [server]
            listen = '127.0.0.1:9090'
            prefix = '/backoffice'
            drain_timeout_secs = 3

            [uploads]
            dir = './uploads'

            [registry]
            allow_override = false

            [logging]
            filter = 'debug'

            [features]
            export = false
        ";
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.tables, vec!["users", "orders"]);
        assert_eq!(config.database.dsn, "sqlite::memory:");
        assert_eq!(config.server.listen, "127.0.0.1:9090");
        assert_eq!(config.server.prefix, "/backoffice");
        assert_eq!(config.drain_timeout(), Duration::from_secs(3));
        let uploads = config.uploads.as_ref().unwrap();
        assert_eq!(uploads.mount, "/uploads");
        assert_eq!(uploads.dir, PathBuf::from("./uploads"));
        assert!(!config.registry.allow_override);
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Reject);
        assert_eq!(config.logging.filter, "debug");
        assert!(!config.feature("export"));
    }

    #[test]
    fn should_report_invalid_when_dsn_missing() {
        let result = Config::from_toml_str("[database]\ndriver = 'sqlite'\n");
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("dsn")));
    }

    #[test]
    fn should_report_invalid_when_database_section_missing() {
        let result = Config::from_toml_str("theme = 'plain'\n");
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("driver")));
    }

    #[test]
    fn should_report_invalid_when_prefix_has_capture() {
        let result =
            Config::from_toml_str(&format!("{MINIMAL}\n[server]\nprefix = '/{{tenant}}'\n"));
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("prefix")));
    }

    #[test]
    fn should_report_malformed_for_invalid_toml() {
        let result = Config::from_toml_str("invalid {{{");
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn should_report_malformed_for_unknown_keys() {
        let result = Config::from_toml_str(&format!("{MINIMAL}\nunexpected = true\n"));
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn should_report_malformed_for_wrong_value_type() {
        let result = Config::from_toml_str("[database]\ndriver = 42\ndsn = 'x'\n");
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn should_report_not_found_for_missing_file() {
        let result = Config::load("definitely-not-here.toml");
        assert!(
            matches!(result, Err(ConfigError::NotFound(path)) if path == Path::new("definitely-not-here.toml"))
        );
    }

    #[test]
    fn should_reject_relative_prefix() {
        let result = Config::from_toml_str(&format!("{MINIMAL}\n[server]\nprefix = 'admin'\n"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_reject_zero_drain_timeout() {
        let result =
            Config::from_toml_str(&format!("{MINIMAL}\n[server]\ndrain_timeout_secs = 0\n"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_reject_root_uploads_mount() {
        let result = Config::from_toml_str(&format!(
            "{MINIMAL}\n[uploads]\nmount = '/'\ndir = './uploads'\n"
        ));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_default_known_feature_flags_on() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert!(config.feature("export"));
        assert!(config.feature("request_tracing"));
        assert!(!config.feature("something_else"));
    }
}
