//! Configuration for the Corridor router server.

use clap::Parser;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use corridor_chain_evm::EvmLedgerConfig;
use corridor_chain_solana::SolanaLedgerConfig;

/// CLI arguments for the Corridor router server.
#[derive(Parser, Debug)]
#[command(name = "corridor-router")]
#[command(about = "Corridor settlement router HTTP server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,
}

/// Server configuration.
///
/// `networks` is keyed by network id; a `BTreeMap` keeps construction order
/// deterministic regardless of file ordering. Routing order itself comes
/// from each entry's `priority`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default)]
    networks: BTreeMap<String, NetworkEntry>,
    #[serde(default)]
    tokens: Vec<TokenEntry>,
}

/// One settlement network: routing metadata plus family-specific connection
/// and signing configuration, dispatched on the `family` tag.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEntry {
    pub priority: u32,
    /// Informational per-transfer fee in token units, used by the estimator.
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default = "config_defaults::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub testnet: bool,
    #[serde(flatten)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "family")]
pub enum LedgerConfig {
    #[serde(rename = "contract-ledger")]
    ContractLedger(EvmLedgerConfig),
    #[serde(rename = "account-ledger")]
    AccountLedger(SolanaLedgerConfig),
}

/// One token deployment on one network.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub symbol: String,
    pub network: String,
    /// Contract address (contract ledgers) or mint address (account ledgers).
    pub asset: String,
    pub decimals: u8,
    #[serde(default = "config_defaults::default_enabled")]
    pub enabled: bool,
}

pub mod config_defaults {
    use std::env;
    use std::net::IpAddr;

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// Default port with fallback: $PORT env var -> 8080
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Default host with fallback: $HOST env var -> "0.0.0.0"
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IpAddr::V4(DEFAULT_HOST.parse().unwrap()))
    }

    pub fn default_enabled() -> bool {
        true
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn networks(&self) -> &BTreeMap<String, NetworkEntry> {
        &self.networks
    }

    pub fn tokens(&self) -> &Vec<TokenEntry> {
        &self.tokens
    }

    /// Load configuration from CLI arguments and JSON file.
    ///
    /// The config file path comes from `--config <path>` or the `CONFIG` env
    /// var, defaulting to `./config.json`. Values not present in the file
    /// resolve via environment variables or defaults during deserialization.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        let config_path = Path::new(&cli_args.config)
            .canonicalize()
            .map_err(|e| ConfigError::FileRead(cli_args.config, e))?;
        Self::load_from_path(config_path)
    }

    fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_ledger_families() {
        let signer = bs58::encode([9u8; 64]).into_string();
        let json = format!(
            r#"{{
                "port": 9090,
                "networks": {{
                    "base": {{
                        "family": "contract-ledger",
                        "priority": 1,
                        "fee": "0.0001",
                        "chain_id": 8453,
                        "rpc": "https://mainnet.base.org",
                        "signer": "0xcafe000000000000000000000000000000000000000000000000000000000001"
                    }},
                    "solana": {{
                        "family": "account-ledger",
                        "priority": 2,
                        "fee": "0.03",
                        "consensus_id": "mainnet-beta",
                        "rpc": "https://api.mainnet-beta.solana.com",
                        "signer": "{signer}"
                    }}
                }},
                "tokens": [
                    {{
                        "symbol": "USDC",
                        "network": "base",
                        "asset": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                        "decimals": 6
                    }}
                ]
            }}"#
        );
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port(), 9090);
        assert_eq!(config.networks().len(), 2);
        assert!(matches!(
            config.networks()["base"].ledger,
            LedgerConfig::ContractLedger(_)
        ));
        assert!(matches!(
            config.networks()["solana"].ledger,
            LedgerConfig::AccountLedger(_)
        ));
        assert_eq!(config.networks()["solana"].priority, 2);
        assert!(config.networks()["base"].enabled);
        assert_eq!(config.tokens().len(), 1);
        assert_eq!(config.tokens()[0].decimals, 6);
    }

    #[test]
    fn unknown_family_is_rejected() {
        let json = r#"{
            "networks": {
                "weird": { "family": "paper-ledger", "priority": 1 }
            }
        }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
