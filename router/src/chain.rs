//! Adapter and catalog construction from configuration.

use std::sync::Arc;

use corridor_chain_evm::EvmChainAdapter;
use corridor_chain_solana::SolanaChainAdapter;
use corridor_types::adapter::ChainAdapter;
use corridor_types::network::{ConnectionInfo, NetworkFamily, NetworkId, NetworkInfo, TokenInfo};

use crate::config::{Config, LedgerConfig};

/// Everything the service needs from config: the catalog the registry is
/// built from, and one constructed adapter per enabled network.
pub struct BuiltChains {
    pub networks: Vec<NetworkInfo>,
    pub tokens: Vec<TokenInfo>,
    pub adapters: Vec<Arc<dyn ChainAdapter>>,
}

/// Builds catalog entries and adapters from the loaded config.
///
/// Disabled networks still land in the catalog (so they remain addressable
/// for diagnostics) but get no adapter. Any construction failure aborts
/// startup; a network that cannot sign must never look routable.
pub fn build_chains(config: &Config) -> Result<BuiltChains, Box<dyn std::error::Error>> {
    let mut networks = Vec::new();
    let mut adapters: Vec<Arc<dyn ChainAdapter>> = Vec::new();

    for (name, entry) in config.networks() {
        let network_id = NetworkId::new(name.as_str());
        let (family, connection) = match &entry.ledger {
            LedgerConfig::ContractLedger(evm) => (
                NetworkFamily::ContractLedger,
                ConnectionInfo::ContractLedger {
                    endpoint: (*evm.rpc).clone(),
                    chain_id: evm.chain_id,
                },
            ),
            LedgerConfig::AccountLedger(solana) => (
                NetworkFamily::AccountLedger,
                ConnectionInfo::AccountLedger {
                    consensus_id: solana.consensus_id.clone(),
                },
            ),
        };
        networks.push(NetworkInfo {
            id: network_id.clone(),
            family,
            priority: entry.priority,
            fee: entry.fee,
            enabled: entry.enabled,
            testnet: entry.testnet,
            connection,
        });

        if !entry.enabled {
            continue;
        }
        let adapter: Arc<dyn ChainAdapter> = match &entry.ledger {
            LedgerConfig::ContractLedger(evm) => {
                Arc::new(EvmChainAdapter::new(network_id, evm)?)
            }
            LedgerConfig::AccountLedger(solana) => {
                Arc::new(SolanaChainAdapter::new(network_id, solana)?)
            }
        };
        adapters.push(adapter);
    }

    let tokens = config
        .tokens()
        .iter()
        .map(|t| TokenInfo {
            symbol: t.symbol.as_str().into(),
            network: NetworkId::new(t.network.as_str()),
            asset: t.asset.clone(),
            decimals: t.decimals,
            enabled: t.enabled,
        })
        .collect();

    Ok(BuiltChains {
        networks,
        tokens,
        adapters,
    })
}
