//! The network/token catalog.

use corridor_types::network::{NetworkId, NetworkInfo, TokenInfo, TokenSymbol};

/// A routable `(network, token)` pair for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub network: &'a NetworkInfo,
    pub token: &'a TokenInfo,
}

/// Read-only catalog of settlement networks and token deployments.
///
/// Networks are held sorted ascending by `(priority, id)` so every lookup
/// that iterates them is deterministic for a fixed catalog. The registry is
/// built once at startup from config; runtime mutation is not supported.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkInfo>,
    tokens: Vec<TokenInfo>,
}

impl NetworkRegistry {
    pub fn new(mut networks: Vec<NetworkInfo>, tokens: Vec<TokenInfo>) -> Self {
        networks.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        Self { networks, tokens }
    }

    /// Enabled networks in ascending `(priority, id)` order.
    pub fn list_enabled_networks(&self) -> Vec<&NetworkInfo> {
        self.networks.iter().filter(|n| n.enabled).collect()
    }

    /// Looks a network up by id, enabled or not.
    pub fn network(&self, id: &NetworkId) -> Option<&NetworkInfo> {
        self.networks.iter().find(|n| &n.id == id)
    }

    /// The deployment of `symbol` on `network`, if the catalog has one.
    pub fn find_token(&self, symbol: &TokenSymbol, network: &NetworkId) -> Option<&TokenInfo> {
        self.tokens
            .iter()
            .find(|t| &t.symbol == symbol && &t.network == network)
    }

    /// Routing candidates for `symbol`: enabled networks, in priority order,
    /// that carry an enabled deployment of the symbol.
    ///
    /// An unsupported symbol yields an empty vec, not an error; the caller
    /// decides how to surface that.
    pub fn candidates_for(&self, symbol: &TokenSymbol) -> Vec<Candidate<'_>> {
        self.networks
            .iter()
            .filter(|n| n.enabled)
            .filter_map(|network| {
                self.find_token(symbol, &network.id)
                    .filter(|t| t.enabled)
                    .map(|token| Candidate { network, token })
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn enabled_networks_come_back_in_priority_order() {
        let registry = NetworkRegistry::new(
            vec![
                network("gamma", 3, "0", true),
                network("alpha", 1, "0", true),
                network("beta", 2, "0", true),
            ],
            vec![],
        );
        let ids: Vec<&str> = registry
            .list_enabled_networks()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn priority_ties_break_by_id() {
        let registry = NetworkRegistry::new(
            vec![network("zeta", 1, "0", true), network("alpha", 1, "0", true)],
            vec![],
        );
        let ids: Vec<&str> = registry
            .list_enabled_networks()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn disabled_networks_are_filtered_out() {
        let registry = NetworkRegistry::new(
            vec![network("up", 1, "0", true), network("down", 2, "0", false)],
            vec![],
        );
        let enabled = registry.list_enabled_networks();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id.as_str(), "up");
        // The disabled network is still addressable directly.
        assert!(registry.network(&NetworkId::new("down")).is_some());
    }

    #[test]
    fn candidates_follow_network_priority() {
        let registry = two_network_registry();
        let candidates = registry.candidates_for(&TokenSymbol::new("USDC"));
        let ids: Vec<&str> = candidates.iter().map(|c| c.network.id.as_str()).collect();
        assert_eq!(ids, vec!["network-a", "network-b"]);
    }

    #[test]
    fn candidates_skip_disabled_token_deployments() {
        let registry = NetworkRegistry::new(
            vec![network("a", 1, "0", true), network("b", 2, "0", true)],
            vec![token("USDC", "a", false), token("USDC", "b", true)],
        );
        let candidates = registry.candidates_for(&TokenSymbol::new("USDC"));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].network.id.as_str(), "b");
    }

    #[test]
    fn unsupported_symbol_yields_empty_candidates() {
        let registry = two_network_registry();
        assert!(registry.candidates_for(&TokenSymbol::new("EURC")).is_empty());
    }
}
