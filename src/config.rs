pub use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::sources::Source;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Environment overrides look like `ADDRBAL__SERVER__BIND=0.0.0.0:8080`.
const ENV_PREFIX: &str = "ADDRBAL";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source used when a request names no currency
    pub default: String,
    pub bch: EndpointConfig,
    pub btc: EndpointConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            default: "bch".to_string(),
            bch: EndpointConfig {
                utxo_url: "https://rest.bitcoin.com/v2/address/utxo/".to_string(),
                tx_url: "https://rest.bitcoin.com/v2/address/transactions/".to_string(),
            },
            btc: EndpointConfig {
                utxo_url: "https://api.blockcypher.com/v1/btc/main/addrs/".to_string(),
                tx_url: "https://api.blockcypher.com/v1/btc/main/addrs/".to_string(),
            },
        }
    }
}

/// Base URLs an adapter appends the address to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub utxo_url: String,
    pub tx_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Some explorers answer 403 to requests without a browser-like agent
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; addrbal)".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// "json" or "pretty"
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Load configuration from `path` (optional file) layered under environment
/// variables. Missing keys fall back to defaults. `sources.default` must name
/// a supported source.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = Config::builder()
        .add_source(ConfigFile::with_name(path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;

    config
        .sources
        .default
        .parse::<Source>()
        .map_err(|e| ConfigError::Message(format!("sources.default: {}", e)))?;

    Ok(config)
}
