//! Lookup of constructed ledger adapters by network id.

use std::collections::HashMap;
use std::sync::Arc;

use corridor_types::adapter::ChainAdapter;
use corridor_types::network::NetworkId;

/// Registry of the adapters constructed at startup, keyed by network id.
///
/// Registry candidates without an adapter here are a configuration drift the
/// router tolerates at runtime (the candidate is skipped as a failed
/// attempt), but builders should treat it as a bug.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<NetworkId, Arc<dyn ChainAdapter>>,
}

impl AdapterRegistry {
    pub fn from_adapters(adapters: Vec<Arc<dyn ChainAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.network_id().clone(), adapter))
            .collect();
        Self { adapters }
    }

    pub fn by_network_id(&self, network_id: &NetworkId) -> Option<&Arc<dyn ChainAdapter>> {
        self.adapters.get(network_id)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
