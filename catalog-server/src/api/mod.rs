//! API routes
//!
//! - [`health`] - health check
//! - [`products`] - product CRUD
//! - [`realtime`] - WebSocket snapshot feed

pub mod health;
pub mod products;
pub mod realtime;

use axum::Router;

use crate::core::ServerState;

/// Every route, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(realtime::router())
}
