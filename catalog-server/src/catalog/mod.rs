//! Product catalog: durable record set plus change notification

pub mod service;
pub mod storage;
pub mod validation;

pub use service::{CatalogService, run_blocking};
pub use storage::{ProductStorage, StorageError, StorageResult};

use shared::error::{AppError, ErrorCode};

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Catalog storage failure");
        match err {
            StorageError::Corrupted { id, reason } => AppError::with_message(
                ErrorCode::StorageCorrupted,
                format!("Stored product {id} is unreadable: {reason}"),
            )
            .with_detail("id", id),
            other => AppError::storage(other.to_string()),
        }
    }
}
