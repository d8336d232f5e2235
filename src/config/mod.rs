/*
 * Configuration management for the BaseSwap client
 */

use crate::models::{BaseSwapError, Result};
use crate::registry;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
    pub trading: TradingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub block_poll_interval_ms: u64,
}

#[derive(Clone, Default, Deserialize, Serialize)]
pub struct WalletConfig {
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingConfig {
    pub default_slippage: String,
    pub confirmation_poll_ms: u64,
}

impl ServerConfig {
    /// The bind address, parsed from `SERVER_HOST`.
    pub fn address(&self) -> Result<IpAddr> {
        self.host.trim().parse().map_err(|e| {
            BaseSwapError::ConfigError(format!("Invalid SERVER_HOST {:?}: {e}", self.host))
        })
    }
}

impl ChainConfig {
    #[must_use]
    pub fn block_poll_interval(&self) -> Duration {
        Duration::from_millis(self.block_poll_interval_ms)
    }
}

impl TradingConfig {
    #[must_use]
    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT", "8080")?,
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            chain: ChainConfig {
                rpc_url: env::var("RPC_URL")
                    .unwrap_or_else(|_| "https://sepolia.base.org".to_string()),
                chain_id: parse_var("CHAIN_ID", "84532")?,
                block_poll_interval_ms: parse_var("BLOCK_POLL_INTERVAL_MS", "2000")?,
            },
            wallet: WalletConfig {
                private_key: env::var("WALLET_PRIVATE_KEY").ok().filter(|k| !k.is_empty()),
            },
            trading: TradingConfig {
                default_slippage: env::var("DEFAULT_SLIPPAGE").unwrap_or_else(|_| "0.5".to_string()),
                confirmation_poll_ms: parse_var("CONFIRMATION_POLL_MS", "1500")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server.address()?;
        if self.chain.block_poll_interval_ms == 0 {
            return Err(BaseSwapError::ConfigError(
                "BLOCK_POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        if self.trading.confirmation_poll_ms == 0 {
            return Err(BaseSwapError::ConfigError(
                "CONFIRMATION_POLL_MS must be greater than zero".to_string(),
            ));
        }
        crate::units::parse_slippage_bps(&self.trading.default_slippage)
            .map_err(|e| BaseSwapError::ConfigError(format!("Invalid DEFAULT_SLIPPAGE: {e}")))?;
        if !registry::is_supported(self.chain.chain_id) {
            tracing::warn!(
                "CHAIN_ID {} has no swap pool deployment; the Base Sepolia addresses will be used",
                self.chain.chain_id
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| BaseSwapError::ConfigError(format!("Invalid {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
            },
            chain: ChainConfig {
                rpc_url: "http://localhost:8545".to_string(),
                chain_id: 84532,
                block_poll_interval_ms: 2000,
            },
            wallet: WalletConfig {
                private_key: Some("0xdeadbeef".to_string()),
            },
            trading: TradingConfig {
                default_slippage: "0.5".to_string(),
                confirmation_poll_ms: 1500,
            },
        }
    }

    #[test]
    fn sample_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = sample();
        config.chain.block_poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(BaseSwapError::ConfigError(_))));
    }

    #[test]
    fn unparseable_host_is_rejected() {
        let mut config = sample();
        config.server.host = "localhost:8080".to_string();
        assert!(matches!(config.validate(), Err(BaseSwapError::ConfigError(_))));
        config.server.host = "::1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_slippage_is_rejected() {
        let mut config = sample();
        config.trading.default_slippage = "abc".to_string();
        assert!(matches!(config.validate(), Err(BaseSwapError::ConfigError(_))));
    }

    #[test]
    fn private_key_is_not_serialized_or_printed() {
        let config = sample();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(!format!("{config:?}").contains("deadbeef"));
    }
}
