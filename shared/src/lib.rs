//! Shared types for the catalog service
//!
//! Types used by the server and by any client that talks to it:
//! error codes and response structures, the product model, and the
//! message bus envelope that carries catalog snapshots.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use message::{BusMessage, EventType};
pub use models::{Product, ProductCreate, ProductUpdate};
