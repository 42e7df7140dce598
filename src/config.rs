//! Runtime configuration sourced from the environment.

use std::{env, net::SocketAddr, path::PathBuf};

use tracing::{info, warn};

/// Environment variable overriding the listen port.
const PORT_ENV: &str = "CINEMATCH_PORT";
/// Fallback port variable honored for container platforms.
const PORT_FALLBACK_ENV: &str = "PORT";
/// Environment variable carrying the bearer credential expected on session routes.
const API_TOKEN_ENV: &str = "CINEMATCH_API_TOKEN";
/// Environment variable overriding where the embedded store keeps its files.
const DATA_DIR_ENV: &str = "CINEMATCH_DATA_DIR";

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;
/// Credential shipped with development clients; overridden in deployments.
const DEFAULT_API_TOKEN: &str = "cinematch-public-token";
/// Default location of the embedded session store.
const DEFAULT_DATA_DIR: &str = "data/sessions";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Bearer credential expected on the session endpoints.
    pub api_token: String,
    /// Directory handed to the embedded session store.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let port = env::var(PORT_ENV)
            .or_else(|_| env::var(PORT_FALLBACK_ENV))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_token = match env::var(API_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => token,
            _ => {
                warn!("{API_TOKEN_ENV} not set; using the public development credential");
                DEFAULT_API_TOKEN.to_owned()
            }
        };

        let data_dir = env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        info!(port, data_dir = %data_dir.display(), "loaded configuration");

        Self {
            port,
            api_token,
            data_dir,
        }
    }

    /// Socket address derived from the configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
