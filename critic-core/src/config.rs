//! Configuration management for Critic
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (CRITIC_*)
//! 3. Config file (~/.config/critic/config.toml)
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::retry::RetryPolicy;
use crate::{Error, Result};

/// Deployment environment; controls whether error details reach clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl Default for Environment {
    /// Debug builds default to development, release builds to production
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub listen_addr: String,

    /// Deployment environment
    pub environment: Environment,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,

    /// Origins allowed to call the API from a browser (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            environment: Environment::default(),
            max_upload_bytes: 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

/// Review database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Create or upgrade the reviews table on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("critic")
            .join("reviews.db");

        Self {
            path,
            max_connections: 5,
            auto_migrate: true,
        }
    }
}

/// Text-generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_url: String,

    /// Model to request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Deadline for a single review request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Bearer token configuration. The signing secret lives in [`crate::Secrets`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of tokens minted by `critic token`
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,

    /// Issuer claim written into minted tokens
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(24 * 60 * 60),
            issuer: "critic".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub retry: RetryPolicy,
    pub generation: GenerationConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/critic/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("critic").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - CRITIC_LISTEN_ADDR: Server listen address
    /// - CRITIC_ENV: `development` or `production`
    /// - CRITIC_DATABASE_PATH: SQLite database file
    /// - CRITIC_MODEL: Generation model
    /// - CRITIC_API_URL: Generation API base URL
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(addr) = var("CRITIC_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Some(env) = var("CRITIC_ENV") {
            self.server.environment = env.parse()?;
        }

        if let Some(path) = var("CRITIC_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(model) = var("CRITIC_MODEL") {
            self.generation.model = model;
        }

        if let Some(url) = var("CRITIC_API_URL") {
            self.generation.api_url = url;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, listen_addr: Option<String>) -> Self {
        if let Some(addr) = listen_addr {
            self.server.listen_addr = addr;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        listen_addr: Option<String>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        let config = config
            .with_env_overrides()?
            .with_cli_overrides(listen_addr);
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.generation.api_url).map_err(|e| {
            Error::Config(format!(
                "Invalid generation.api_url '{}': {}",
                self.generation.api_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "generation.api_url must be http(s), got '{}'",
                url.scheme()
            )));
        }

        if self.generation.timeout.is_zero() {
            return Err(Error::Config(
                "generation.timeout must be greater than zero".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
