//! Health check route
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /health | GET | liveness plus catalog stats |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "products": 12,
//!   "subscribers": 3,
//!   "snapshot_version": 40,
//!   "uptime_seconds": 3600
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Stored products
    pub products: u64,
    /// Open WebSocket subscribers
    pub subscribers: usize,
    /// Version of the last published snapshot
    pub snapshot_version: u64,
    pub uptime_seconds: u64,
}

/// GET /health
///
/// Fails with 500 when the database cannot be read.
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<HealthResponse>> {
    let products = state.catalog.count()?;
    let uptime_ms = (now_millis() - state.started_at).max(0) as u64;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        products,
        subscribers: state.message_bus.client_count(),
        snapshot_version: state.catalog.snapshot_version(),
        uptime_seconds: uptime_ms / 1000,
    }))
}
