use crate::api::ServerConfig;
use crate::contracts::NumbersError;

/// Default store location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "./data/numbers";

/// Process configuration, read once at startup.
///
/// Reads:
/// - `DATABASE_URL`: store directory (default: `./data/numbers`)
/// - `HOST`: listen address (default: `0.0.0.0`)
/// - `PORT`: listen port (default: 8080)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub server: ServerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, NumbersError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NumbersError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let default_server = ServerConfig::default();

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| NumbersError::Config(format!("Invalid PORT: {}", raw)))?,
            None => default_server.port,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            server: ServerConfig {
                host: var("HOST").unwrap_or(default_server.host),
                port,
            },
        })
    }
}
