//! Network registry and cost estimator.
//!
//! The registry is the read-only catalog of settlement networks and token
//! deployments, built once from config at startup. It answers the routing
//! question — which `(network, token)` pairs can carry a given symbol, in
//! what order — without touching any ledger. The estimator prices those same
//! candidates.

pub mod estimator;
pub mod registry;

pub use estimator::{CostEstimate, estimate_costs};
pub use registry::{Candidate, NetworkRegistry};
