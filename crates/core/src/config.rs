//! Application configuration: TOML file, environment overrides, defaults.
//!
//! Precedence, lowest to highest: built-in defaults, config file
//! (`foreman.toml` or `FOREMAN_CONFIG`), environment variables. Secrets are
//! wrapped in `SecretString` so they never land in debug output or logs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "foreman.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

/// Where agent/model records live. With no path configured the built-in
/// defaults are used instead of a file-backed store.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_owned(), port: 8080 },
            llm: LlmConfig { api_key: None, base_url: None, timeout_secs: 30 },
            store: StoreConfig::default(),
            logging: LoggingConfig { level: "info".to_owned(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    #[serde(default)]
    server: ServerPatch,
    #[serde(default)]
    llm: LlmPatch,
    #[serde(default)]
    store: StorePatch,
    #[serde(default)]
    logging: LoggingPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorePatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => {
                let patch = read_patch(&path)?;
                config.apply_patch(patch);
            }
            None if options.require_file => {
                return Err(ConfigError::MissingConfigFile(
                    options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
                ));
            }
            None => {}
        }

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(bind_address) = patch.server.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = patch.server.port {
            self.server.port = port;
        }
        if let Some(api_key) = patch.llm.api_key {
            self.llm.api_key = Some(api_key.into());
        }
        if let Some(base_url) = patch.llm.base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(timeout_secs) = patch.llm.timeout_secs {
            self.llm.timeout_secs = timeout_secs;
        }
        if let Some(path) = patch.store.path {
            self.store.path = Some(path);
        }
        if let Some(level) = patch.logging.level {
            self.logging.level = level;
        }
        if let Some(format) = patch.logging.format {
            self.logging.format = format;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("FOREMAN_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Ok(value) = env::var("FOREMAN_PORT") {
            self.server.port = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "FOREMAN_PORT".to_owned(),
                value,
            })?;
        }
        if let Ok(value) = env::var("GEMINI_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Ok(value) = env::var("GEMINI_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Ok(value) = env::var("FOREMAN_STORE_PATH") {
            self.store.path = Some(PathBuf::from(value));
        }
        if let Ok(value) = env::var("FOREMAN_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Ok(value) = env::var("FOREMAN_LOG_FORMAT") {
            self.logging.format =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "FOREMAN_LOG_FORMAT".to_owned(),
                    value,
                })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation("server.bind_address must be non-empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation("llm.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Ok(value) = env::var("FOREMAN_CONFIG") {
        let path = PathBuf::from(value);
        return path.exists().then_some(path);
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&contents)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{AppConfig, ConfigError, ConfigPatch, LogFormat};

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.llm.api_key.is_none());
        assert!(config.store.path.is_none());
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn patch_overrides_only_present_fields() {
        let patch: ConfigPatch = toml::from_str(
            r#"
            [server]
            port = 9000

            [llm]
            api_key = "test-key"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.apply_patch(patch);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert!(config.llm.api_key.is_some());
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<ConfigPatch, _> = toml::from_str(
            r#"
            [server]
            prot = 9000
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn log_format_parse_rejects_unknown_values() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!("fancy".parse::<LogFormat>(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = AppConfig::default();
        config.llm.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn read_patch_reports_parse_failures_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [").unwrap();

        let error = super::read_patch(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::ParseFile { .. }));
    }
}
