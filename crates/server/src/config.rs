//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PINMARK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `PINMARK_REGISTRATION_CODE` - Code new users must present to register
//!
//! ## Optional
//! - `PINMARK_DATABASE_URL` - `SQLite` connection string, falls back to
//!   `DATABASE_URL` (default: `sqlite://bookmarks.db?mode=rwc`)
//! - `PINMARK_HOST` - Bind address (default: 127.0.0.1)
//! - `PINMARK_PORT` - Listen port, falls back to `PORT` (default: 8080)
//! - `PINMARK_STRICT_REORDER` - Reject reorders that are not a full
//!   permutation of the user's bookmarks (default: false)
//! - `PINMARK_STATIC_DIR` - Directory holding the web client
//!   (default: crates/server/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_DATABASE_URL: &str = "sqlite://bookmarks.db?mode=rwc";
const DEFAULT_STATIC_DIR: &str = "crates/server/static";

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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SQLite` connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Registration invite code
    pub registration_code: SecretString,
    /// Require reorders to name every bookmark exactly once
    pub strict_reorder: bool,
    /// Directory served at `/` and `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let database_url = env.database_url();
        let host = env
            .or_default("PINMARK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PINMARK_HOST".to_string(), e.to_string()))?;
        let port = env
            .optional("PINMARK_PORT")
            .or_else(|| env.optional("PORT"))
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PINMARK_PORT".to_string(), e.to_string()))?;

        let jwt_secret = env.validated_secret("PINMARK_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "PINMARK_JWT_SECRET")?;

        let registration_code = env.required("PINMARK_REGISTRATION_CODE")?;
        if registration_code.is_empty() {
            return Err(ConfigError::MissingEnvVar(
                "PINMARK_REGISTRATION_CODE".to_string(),
            ));
        }

        let strict_reorder = parse_bool(
            "PINMARK_STRICT_REORDER",
            &env.or_default("PINMARK_STRICT_REORDER", "false"),
        )?;
        let static_dir = PathBuf::from(env.or_default("PINMARK_STATIC_DIR", DEFAULT_STATIC_DIR));

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            registration_code: SecretString::from(registration_code),
            strict_reorder,
            static_dir,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve only the database URL from the environment.
///
/// Tools that touch the store (migrations, account admin) need this without
/// the server's secrets being configured.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    let _ = dotenvy::dotenv();
    Env(|key: &str| std::env::var(key).ok()).database_url()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the lookup helpers used by the loader.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// `PINMARK_DATABASE_URL`, then `DATABASE_URL`, then the default.
    fn database_url(&self) -> SecretString {
        SecretString::from(
            self.optional("PINMARK_DATABASE_URL")
                .or_else(|| self.optional("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        )
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Validate that the signing secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const GOOD_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6e";

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("PINMARK_JWT_SECRET", GOOD_SECRET),
            ("PINMARK_REGISTRATION_CODE", "open-sesame"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&minimal()).unwrap();

        assert_eq!(config.database_url.expose_secret(), DEFAULT_DATABASE_URL);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert!(!config.strict_reorder);
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.registration_code.expose_secret(), "open-sesame");
    }

    #[test]
    fn test_fallback_variables() {
        let mut vars = minimal();
        vars.push(("DATABASE_URL", "sqlite::memory:"));
        vars.push(("PORT", "9000"));
        let config = load(&vars).unwrap();

        assert_eq!(config.database_url.expose_secret(), "sqlite::memory:");
        assert_eq!(config.port, 9000);

        vars.push(("PINMARK_DATABASE_URL", "sqlite://pins.db"));
        vars.push(("PINMARK_PORT", "9001"));
        let config = load(&vars).unwrap();

        assert_eq!(config.database_url.expose_secret(), "sqlite://pins.db");
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("PINMARK_REGISTRATION_CODE", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "PINMARK_JWT_SECRET"));

        let err = load(&[("PINMARK_JWT_SECRET", GOOD_SECRET)]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "PINMARK_REGISTRATION_CODE"));
    }

    #[test]
    fn test_strict_reorder_flag() {
        let mut vars = minimal();
        vars.push(("PINMARK_STRICT_REORDER", "true"));
        assert!(load(&vars).unwrap().strict_reorder);

        let mut vars = minimal();
        vars.push(("PINMARK_STRICT_REORDER", "maybe"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(_, _)
        ));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = minimal();
        vars.push(("PINMARK_PORT", "eighty"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(_, _)
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&minimal()).unwrap();
        let debug_output = format!("{config:?}");

        assert!(!debug_output.contains(GOOD_SECRET));
        assert!(!debug_output.contains("open-sesame"));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-key-here", "TEST_VAR");
        assert!(matches!(result.unwrap_err(), ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result.unwrap_err(), ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let mut vars = minimal();
        vars[0] = ("PINMARK_JWT_SECRET", "aB3$xY9!mK2@");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }
}
