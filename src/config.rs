//! TOML configuration for the incident service.
//!
//! Every section has compiled-in defaults. The config file is looked up from
//! an explicit path, then `INCIDENTDESK_CONFIG`, then `./incidentdesk.toml`.
//! The classifier credential comes from `OPENAI_API_KEY` when set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::openai::OpenAiCompletion;
use crate::classify::Classifier;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "INCIDENTDESK_CONFIG";

/// Environment variable holding the classifier credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const LOCAL_CONFIG: &str = "incidentdesk.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded service configuration");
        Ok(config)
    }

    /// Resolve the configuration file and apply environment overrides.
    ///
    /// An explicit `path` must load; the implicit locations fall back to
    /// defaults with a warning.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::load_or_default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "INCIDENTDESK_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.classifier.api_key = Some(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API binds to.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding the incidents table.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("incidents.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request timeout for the completion call.
    pub timeout_secs: u64,
    /// Blank or missing selects static-default mode.
    pub api_key: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.1,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl ClassifierConfig {
    /// The credential, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Build the classifier this configuration describes.
    pub fn build(&self) -> Result<Classifier> {
        match self.api_key() {
            Some(key) => {
                let backend = OpenAiCompletion::new(key, self)
                    .context("failed to build completion client")?;
                info!(model = %self.model, endpoint = backend.endpoint(), "AI classification enabled");
                Ok(Classifier::new(Arc::new(backend)))
            }
            None => {
                warn!("{API_KEY_ENV} not set, incidents get default classification");
                Ok(Classifier::static_default())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.database.path, PathBuf::from("incidents.db"));
        assert_eq!(config.classifier.model, "gpt-3.5-turbo");
        assert!(config.classifier.api_key().is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [classifier]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.classifier.timeout_secs, 5);
        assert_eq!(config.classifier.base_url, "https://api.openai.com/v1");
        assert_eq!(config.database.path, PathBuf::from("incidents.db"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/x.db\"\n[logging]\njson = true").unwrap();
        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = ServiceConfig::load(Path::new("/nonexistent/incidentdesk.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_blank_key_is_static_mode() {
        let config = ClassifierConfig {
            api_key: Some("   ".into()),
            ..ClassifierConfig::default()
        };
        assert!(config.api_key().is_none());
        assert!(!config.build().unwrap().is_live());
    }

    #[test]
    fn test_key_enables_live_mode() {
        let config = ClassifierConfig {
            api_key: Some("sk-test".into()),
            ..ClassifierConfig::default()
        };
        assert!(config.build().unwrap().is_live());
    }
}
