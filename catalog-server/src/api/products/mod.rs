//! Product API
//!
//! | Path | Method | Result |
//! |------|--------|--------|
//! | /api/products | GET | `{products}`, optional `?limit=N` |
//! | /api/products | POST | 201 `{message, product}` |
//! | /api/products/{id} | GET | `{product}` or 404 |
//! | /api/products/{id} | PUT | `{message}` |
//! | /api/products/{id} | DELETE | `{message, products}` |

mod extract;
pub mod handler;

pub use extract::{ProductBody, ProductId};

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
