use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "BASIC_OAUTH_CONFIG";

/// Longest accepted session lifetime: one year, in seconds.
pub const MAX_TOKEN_TTL: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// In-process store, sessions are lost on restart. Development only.
    Memory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    /// Logical database index.
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub password: Option<String>,
    /// Upper bound for a single store round-trip, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connection URL in the form understood by the redis client.
    pub fn redis_url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{password}@{}:{}/{}",
                self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: default_store_host(),
            port: default_store_port(),
            db: 0,
            password: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

/// Paths the built-in endpoints are mounted at. A `null` or empty path leaves
/// the endpoint out, e.g. for an application serving its own logout page.
#[derive(Clone, Debug, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_login_path")]
    pub login: Option<String>,
    #[serde(default = "default_logout_path")]
    pub logout: Option<String>,
    #[serde(default = "default_script_path")]
    pub script: Option<String>,
}

impl EndpointsConfig {
    pub fn login_path(&self) -> Option<&str> {
        mount_path(&self.login)
    }

    pub fn logout_path(&self) -> Option<&str> {
        mount_path(&self.logout)
    }

    pub fn script_path(&self) -> Option<&str> {
        mount_path(&self.script)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mounted = [
            ("login", self.login_path()),
            ("logout", self.logout_path()),
            ("script", self.script_path()),
        ];
        for (i, (name, path)) in mounted.iter().enumerate() {
            let Some(path) = path else { continue };
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "endpoints.{name} must start with '/'"
                )));
            }
            if let Some((other, _)) = mounted[..i].iter().find(|(_, p)| *p == Some(*path)) {
                return Err(ConfigError::Validation(format!(
                    "endpoints.{name} and endpoints.{other} share the path {path}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            login: default_login_path(),
            logout: default_logout_path(),
            script: default_script_path(),
        }
    }
}

fn mount_path(path: &Option<String>) -> Option<&str> {
    path.as_deref().filter(|p| !p.is_empty())
}

/// A fixed username/password pair for the development authenticator.
#[derive(Clone, Debug, Deserialize)]
pub struct CredentialConfig {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub store: StoreConfig,
    /// Session lifetime in seconds, reset on every authorized request.
    #[serde(default = "default_token_ttl")]
    pub token_ttl: u64,
    /// Set the `Secure` attribute on the access token cookie.
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
    /// Origin allowed to call the API cross-origin with credentials.
    #[serde(default)]
    pub allow_origin: Option<String>,
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl AppConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl == 0 {
            return Err(ConfigError::Validation("token_ttl must be > 0".into()));
        }
        if self.token_ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::Validation(format!(
                "token_ttl must be <= {MAX_TOKEN_TTL} seconds"
            )));
        }
        if self.store.backend == StoreBackend::Redis {
            if self.store.host.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "store.host must not be empty".into(),
                ));
            }
            if self.store.port == 0 {
                return Err(ConfigError::Validation("store.port must be > 0".into()));
            }
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "store.timeout_ms must be > 0".into(),
            ));
        }
        self.endpoints.validate()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            store: StoreConfig::default(),
            token_ttl: default_token_ttl(),
            secure_cookie: default_secure_cookie(),
            allow_origin: None,
            credentials: Vec::new(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_store_host() -> String {
    "localhost".to_string()
}

fn default_store_port() -> u16 {
    6379
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_login_path() -> Option<String> {
    Some("/login".to_string())
}

fn default_logout_path() -> Option<String> {
    Some("/logout".to_string())
}

fn default_script_path() -> Option<String> {
    Some("/js/oauth_client.js".to_string())
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_secure_cookie() -> bool {
    true
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// The file path can be replaced through `BASIC_OAUTH_CONFIG`. Any environment
/// variable matching a key path separated by double underscores (e.g.
/// `STORE__PORT`) overrides the file value.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.yaml".to_string());
    load_config_from(&path)
}

/// Same as [`load_config`] with an explicit file path. A missing file is not
/// an error, every setting has a default.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token_ttl(), Duration::from_secs(3600));
        assert!(config.secure_cookie);
        assert_eq!(config.store.backend, StoreBackend::Redis);
    }

    #[test]
    fn redis_url_without_password() {
        let store = StoreConfig {
            host: "cache.internal".into(),
            port: 6380,
            db: 2,
            ..StoreConfig::default()
        };
        assert_eq!(store.redis_url(), "redis://cache.internal:6380/2");
    }

    #[test]
    fn redis_url_with_password() {
        let store = StoreConfig {
            password: Some("hunter2".into()),
            ..StoreConfig::default()
        };
        assert_eq!(store.redis_url(), "redis://:hunter2@localhost:6379/0");
    }

    #[test]
    fn rejects_zero_ttl() {
        let config = AppConfig {
            token_ttl: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_ttl_above_one_year() {
        let config = AppConfig {
            token_ttl: MAX_TOKEN_TTL,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());

        for token_ttl in [MAX_TOKEN_TTL + 1, 1 << 63, u64::MAX] {
            let config = AppConfig {
                token_ttl,
                ..AppConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        }
    }

    #[test]
    fn endpoints_can_be_moved_or_left_out() {
        let endpoints = EndpointsConfig {
            login: Some("/auth/token".into()),
            logout: None,
            script: Some(String::new()),
        };
        assert!(endpoints.validate().is_ok());
        assert_eq!(endpoints.login_path(), Some("/auth/token"));
        assert_eq!(endpoints.logout_path(), None);
        assert_eq!(endpoints.script_path(), None);
    }

    #[test]
    fn rejects_bad_endpoint_paths() {
        let relative = EndpointsConfig {
            login: Some("login".into()),
            ..EndpointsConfig::default()
        };
        assert!(matches!(relative.validate(), Err(ConfigError::Validation(_))));

        let clash = EndpointsConfig {
            logout: Some("/login".into()),
            ..EndpointsConfig::default()
        };
        match clash.validate() {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("endpoints.logout")),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn memory_backend_ignores_connection_settings() {
        let config = AppConfig {
            store: StoreConfig {
                backend: StoreBackend::Memory,
                host: String::new(),
                port: 0,
                ..StoreConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
