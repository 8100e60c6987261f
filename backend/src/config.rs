//! Process configuration read from the environment (and `.env` when present).

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub log_level: String,
    pub export_dir: PathBuf,
    /// `None` means the in-memory store
    pub store: Option<StoreConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(
            &env::var("AVALANCHE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("AVALANCHE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("AVALANCHE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("AVALANCHE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let export_dir = env::var("AVALANCHE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("exports"));

        let url = non_empty_var("SUPABASE_URL");
        let api_key = non_empty_var("SUPABASE_ANON_KEY");
        let store = match (url, api_key) {
            (Some(url), Some(api_key)) => Some(StoreConfig { url, api_key }),
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingStoreCredentials)
            }
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            log_level,
            export_dir,
            store,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(ConfigError::InvalidHost)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Hosted record store endpoint and its anonymous key.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AVALANCHE_PORT must be a valid u16")]
    InvalidPort,
    #[error("AVALANCHE_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[source] std::net::AddrParseError),
    #[error("SUPABASE_URL and SUPABASE_ANON_KEY are required in production")]
    MissingStoreCredentials,
}
