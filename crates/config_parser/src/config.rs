use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::{ConfigParserError, Result};

pub const ENV_PREFIX: &str = "CRYPTO";
pub const DEFAULT_ROUTER_URL: &str = "127.0.0.1:9000";
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_QUEUE_SIZE: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Address of the router socket: the client binds it, signer processes connect to it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RouterConfig {
    #[serde(default = "default_router_url")]
    pub url: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            url: default_router_url(),
        }
    }
}

impl RouterConfig {
    #[inline]
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(SocketAddr::from_str(&self.url)?)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[instrument(level = "debug", ret)]
    pub fn init_config(path: &str) -> Result<Self> {
        let config: Self = load(path)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigParserError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SignerConfig {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            workers: DEFAULT_WORKERS,
            queue_size: DEFAULT_QUEUE_SIZE,
        }
    }
}

impl SignerConfig {
    #[instrument(level = "debug", ret)]
    pub fn init_config(path: &str) -> Result<Self> {
        let config: Self = load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ConfigParserError::InvalidValue {
                field: "workers",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.queue_size == 0 {
            return Err(ConfigParserError::InvalidValue {
                field: "queue_size",
                reason: "work queue must hold at least one request".to_string(),
            });
        }
        Ok(())
    }
}

/// Merges the (optional) TOML file at `path` with `CRYPTO_*` environment overrides,
/// e.g. `CRYPTO_WORKERS=4` or `CRYPTO_ROUTER__URL=0.0.0.0:9000`.
fn load<T: DeserializeOwned>(path: &str) -> Result<T> {
    trace!("Loading configuration from '{path}'");
    let config = Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    debug!("Configuration sources merged");
    Ok(config.try_deserialize::<T>()?)
}

fn default_router_url() -> String {
    DEFAULT_ROUTER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = SignerConfig::init_config("/nonexistent/crypto/signer.toml").unwrap();
        assert_eq!(config, SignerConfig::default());
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.queue_size, DEFAULT_QUEUE_SIZE);
    }

    #[test]
    fn signer_config_is_read_from_toml() {
        let file = write_config(
            r#"
            workers = 4
            queue_size = 16

            [router]
            url = "127.0.0.1:9100"
            "#,
        );
        let config = SignerConfig::init_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_size, 16);
        assert_eq!(config.router.url, "127.0.0.1:9100");
        assert_eq!(config.router.socket_addr().unwrap().port(), 9100);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let file = write_config("workers = 0\n");
        let err = SignerConfig::init_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigParserError::InvalidValue { field: "workers", .. }));
    }

    #[test]
    fn client_timeout_is_converted_to_duration() {
        let file = write_config("request_timeout_secs = 5\n");
        let config = ClientConfig::init_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.router, RouterConfig::default());
    }

    #[test]
    fn malformed_router_url_fails_conversion() {
        let router = RouterConfig {
            url: "not an address".to_string(),
        };
        assert!(matches!(
            router.socket_addr(),
            Err(ConfigParserError::SocketConversionError(_))
        ));
    }
}
