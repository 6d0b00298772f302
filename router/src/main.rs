//! Corridor settlement router HTTP entrypoint.
//!
//! Launches an Axum-based HTTP server that routes stablecoin transfers across
//! the configured settlement networks in priority order.
//!
//! Endpoints:
//! - `POST /transfer` – Route a transfer, failing over across networks
//! - `GET /networks` – Enabled settlement network catalog
//! - `GET /estimates` – Per-network cost estimates for a token/amount
//! - `GET /health` – Liveness
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control binding address
//! - `CONFIG` (or `--config`) selects the JSON configuration file
//! - `RUST_LOG` controls log filtering

mod chain;
mod config;
mod run;
mod shutdown;

use std::process;

use crate::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
