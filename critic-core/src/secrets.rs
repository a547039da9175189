//! Secrets management for Critic
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/critic/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GROQ_API_KEY, CRITIC_JWT_SECRET)
//! 2. Secrets file (~/.config/critic/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable holding the generation API key
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Environment variable holding the token signing secret
pub const JWT_SECRET_VAR: &str = "CRITIC_JWT_SECRET";

/// Secrets structure
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// Generation API credentials
    pub groq: GroqSecrets,

    /// Bearer token signing
    pub auth: AuthSecrets,
}

/// Generation API secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroqSecrets {
    /// Groq API key
    pub api_key: Option<String>,
}

/// Token signing secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSecrets {
    /// HMAC secret used to sign and verify bearer tokens
    pub jwt_secret: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("groq_api_key", &self.groq.api_key.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.auth.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Readable by group or others
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        secrets.groq.api_key = secrets.groq.api_key.map(|k| k.trim().to_string());
        secrets.auth.jwt_secret = secrets.auth.jwt_secret.map(|s| s.trim().to_string());

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/critic/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("critic").join("secrets.toml"))
    }

    /// Get the Groq API key with environment variable override
    ///
    /// Priority: GROQ_API_KEY env var > secrets file
    pub fn groq_api_key(&self) -> Option<String> {
        pick(
            GROQ_API_KEY_VAR,
            std::env::var(GROQ_API_KEY_VAR).ok(),
            self.groq.api_key.as_deref(),
        )
    }

    /// Get the token signing secret with environment variable override
    ///
    /// Priority: CRITIC_JWT_SECRET env var > secrets file
    pub fn jwt_secret(&self) -> Option<String> {
        pick(
            JWT_SECRET_VAR,
            std::env::var(JWT_SECRET_VAR).ok(),
            self.auth.jwt_secret.as_deref(),
        )
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        // Don't overwrite existing file
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# Critic Secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[groq]
# Groq API key, from https://console.groq.com/keys
api_key = ""

[auth]
# Secret used to sign and verify bearer tokens (any long random string)
jwt_secret = ""
"#;

        std::fs::write(&path, template).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your keys");

        Ok(path)
    }
}

/// Prefer a non-empty environment value, then a non-empty file value
fn pick(var: &str, from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    if let Some(value) = from_env.map(|v| v.trim().to_string()) {
        if !value.is_empty() {
            debug!(var, "Using secret from environment variable");
            return Some(value);
        }
    }

    match from_file {
        Some(value) if !value.is_empty() => {
            debug!(var, "Using secret from secrets file");
            Some(value.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.groq.api_key.is_none());
        assert!(secrets.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[groq]
api_key = "gsk_xxxxxxxxxxxx"

[auth]
jwt_secret = "hunter2hunter2"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.groq.api_key, Some("gsk_xxxxxxxxxxxx".to_string()));
        assert_eq!(secrets.auth.jwt_secret, Some("hunter2hunter2".to_string()));
    }

    #[test]
    fn test_env_value_wins_over_file() {
        assert_eq!(
            pick("X", Some("  from_env ".into()), Some("from_file")),
            Some("from_env".to_string())
        );
        assert_eq!(
            pick("X", Some("   ".into()), Some("from_file")),
            Some("from_file".to_string())
        );
        assert_eq!(pick("X", None, Some("")), None);
    }

    #[test]
    fn test_debug_redacts() {
        let secrets = Secrets {
            groq: GroqSecrets {
                api_key: Some("gsk_secret".into()),
            },
            auth: AuthSecrets::default(),
        };
        let shown = format!("{:?}", secrets);
        assert!(!shown.contains("gsk_secret"));
        assert!(shown.contains("<redacted>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[groq]\napi_key = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\njwt_secret = \"  s3cret  \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.auth.jwt_secret, Some("s3cret".to_string()));
    }
}
