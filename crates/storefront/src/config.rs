//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DOCSTORE_BASE_URL` - Base URL of the hosted document store
//! - `DOCSTORE_API_KEY` - API key for the document store (validated)
//! - `UPLOAD_URL` - Image upload endpoint
//! - `UPLOAD_PRESET` - Unsigned upload preset name
//!
//! ## Optional
//! - `STOREFRONT_STATE_DIR` - Directory for persisted client state such as
//!   the cart slot (default: `.husk-threads`)

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Hosted document store configuration.
    pub docstore: DocStoreConfig,
    /// Image upload service configuration.
    pub uploads: UploadConfig,
    /// Directory for persisted client state (cart slot).
    pub state_dir: PathBuf,
}

/// Hosted document store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct DocStoreConfig {
    /// Base URL of the document store (e.g., `https://store.example.com`)
    pub base_url: String,
    /// API key sent with every request (server-issued, high entropy)
    pub api_key: SecretString,
}

impl std::fmt::Debug for DocStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Image upload service configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Upload endpoint URL.
    pub url: String,
    /// Unsigned upload preset name (safe to expose).
    pub preset: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let docstore = DocStoreConfig::from_env()?;
        let uploads = UploadConfig::from_env()?;
        let state_dir = PathBuf::from(get_env_or_default("STOREFRONT_STATE_DIR", ".husk-threads"));

        Ok(Self {
            docstore,
            uploads,
            state_dir,
        })
    }
}

impl DocStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_required_env("DOCSTORE_BASE_URL")?,
            api_key: get_validated_secret("DOCSTORE_API_KEY")?,
        })
    }
}

impl UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: get_required_env("UPLOAD_URL")?,
            preset: get_required_env("UPLOAD_PRESET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
