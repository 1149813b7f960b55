//! # configs
//!
//! Layered runtime settings. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional, not committed)
//! 4. environment variables prefixed `BOARD__`, e.g. `BOARD__SERVER__PORT=9000`
//!
//! A `.env` file, when present, is loaded into the environment first.

use std::time::Duration;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const MIN_SECRET_LEN: usize = 32;
const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 366;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub store: StoreSettings,
    pub home: HomeSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Scheme and authority used when building share links, e.g. `https://board.example`.
    pub public_origin: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// HMAC key for session tokens.
    pub session_secret: SecretString,
    pub session_ttl_secs: u64,
    pub cookie_name: String,
    /// Enables the form-based development sign-in.
    pub dev_login: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_url: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeSettings {
    /// How long home-page counts may be served before they are recounted.
    pub revalidate_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Settings {
    /// Loads `.env`, then every layered source.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("BOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Builder pre-filled with defaults; callers add their own sources.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.public_origin", "http://127.0.0.1:8080")?
            .set_default("auth.session_ttl_secs", 60 * 60 * 24 * 30)?
            .set_default("auth.cookie_name", "board_session")?
            .set_default("auth.dev_login", false)?
            .set_default("store.backend", "memory")?
            .set_default("home.revalidate_secs", 60)?
            .set_default("log.format", "pretty")?
            .set_default("log.filter", "info")?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.session_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.auth.session_ttl_secs == 0 || self.auth.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "auth.session_ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}"
            )));
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::Invalid(
                "store.database_url is required for the postgres backend".into(),
            ));
        }
        if self.server.public_origin.is_empty() {
            return Err(ConfigError::Invalid("server.public_origin is empty".into()));
        }
        Ok(())
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `public_origin` without a trailing slash.
    pub fn origin(&self) -> &str {
        self.public_origin.trim_end_matches('/')
    }
}

impl AuthSettings {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl HomeSettings {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings_with(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Settings::builder()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Settings::from_config(builder.build()?)
    }

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let s = settings_with(&[("auth.session_secret", SECRET)]).unwrap();
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.store.backend, StoreBackend::Memory);
        assert_eq!(s.home.revalidate(), Duration::from_secs(60));
        assert_eq!(s.log.format, LogFormat::Pretty);
        assert!(!s.auth.dev_login);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        assert!(matches!(settings_with(&[]), Err(ConfigError::Load(_))));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = settings_with(&[("auth.session_secret", "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn postgres_backend_requires_a_database_url() {
        let err = settings_with(&[
            ("auth.session_secret", SECRET),
            ("store.backend", "postgres"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let ok = settings_with(&[
            ("auth.session_secret", SECRET),
            ("store.backend", "postgres"),
            ("store.database_url", "postgres://localhost/board"),
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn session_ttl_is_bounded() {
        for ttl in ["0", "315360000000"] {
            let err = settings_with(&[("auth.session_secret", SECRET), ("auth.session_ttl_secs", ttl)])
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "ttl {ttl} accepted");
        }
        let s = settings_with(&[("auth.session_secret", SECRET), ("auth.session_ttl_secs", "3600")]).unwrap();
        assert_eq!(s.auth.session_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn unknown_store_keys_are_ignored() {
        let s = settings_with(&[("auth.session_secret", SECRET), ("store.api_key", "legacy")]).unwrap();
        assert_eq!(s.store.backend, StoreBackend::Memory);
        assert!(s.store.database_url.is_none());
    }

    #[test]
    fn origin_drops_trailing_slash() {
        let s = settings_with(&[
            ("auth.session_secret", SECRET),
            ("server.public_origin", "https://board.example/"),
        ])
        .unwrap();
        assert_eq!(s.server.origin(), "https://board.example");
    }
}
