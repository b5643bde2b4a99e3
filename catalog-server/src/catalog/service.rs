//! Catalog service
//!
//! Owns the product storage and the change notifier. Every mutation runs
//! under a single write gate covering validate, persist and publish, so
//! snapshots leave in the same order the mutations committed. The published
//! list is read inside the mutating transaction, so it is exactly the state
//! that commit produced. Reads go straight to redb read transactions and
//! never wait on the gate.
//!
//! All methods block on the gate and on disk I/O; async callers go through
//! [`run_blocking`].

use std::sync::Arc;

use parking_lot::Mutex;
use shared::message::SyncAction;
use shared::models::{Product, ProductCreate, ProductUpdate};

use super::storage::{ProductStorage, StorageError};
use super::validation::{apply_update, validate_create, validate_update};
use crate::message::{ChangeNotifier, SnapshotSink};
use crate::utils::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct CatalogService {
    storage: ProductStorage,
    notifier: ChangeNotifier,
    write_gate: Arc<Mutex<()>>,
}

impl CatalogService {
    pub fn new(storage: ProductStorage, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            storage,
            notifier: ChangeNotifier::new(sink),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    // ========== Reads ==========

    /// Every product in creation order
    pub fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.storage.load_all()?)
    }

    pub fn get_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        Ok(self.storage.get(id)?)
    }

    pub fn count(&self) -> AppResult<u64> {
        Ok(self.storage.count()?)
    }

    /// Version of the last published snapshot
    pub fn snapshot_version(&self) -> u64 {
        self.notifier.version()
    }

    // ========== Mutations ==========

    /// Validate and store a new product under a fresh id
    pub fn add(&self, payload: ProductCreate) -> AppResult<Product> {
        let valid = validate_create(payload)?;

        let _gate = self.write_gate.lock();
        let txn = self.storage.begin_write()?;
        let id = self.storage.allocate_id(&txn)?;
        let product = valid.into_product(id);
        self.storage.put(&txn, &product)?;
        let products = self.storage.load_all_in(&txn)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(product_id = id, code = %product.code, "Product created");
        self.notifier.notify(SyncAction::Created, Some(id), products);
        Ok(product)
    }

    /// Merge the supplied fields into an existing product
    pub fn update(&self, id: i64, payload: ProductUpdate) -> AppResult<()> {
        let _gate = self.write_gate.lock();
        let txn = self.storage.begin_write()?;
        let Some(mut product) = self.storage.get_in(&txn, id)? else {
            return Err(AppError::product_not_found(id));
        };
        validate_update(id, &payload)?;

        apply_update(&mut product, payload);
        self.storage.put(&txn, &product)?;
        let products = self.storage.load_all_in(&txn)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(product_id = id, "Product updated");
        self.notifier.notify(SyncAction::Updated, Some(id), products);
        Ok(())
    }

    /// Delete a product and return it
    pub fn remove(&self, id: i64) -> AppResult<Product> {
        self.remove_and_list(id).map(|(removed, _)| removed)
    }

    /// Delete a product, returning it together with the list it left behind
    /// (the same list the deletion snapshot carries)
    pub fn remove_and_list(&self, id: i64) -> AppResult<(Product, Vec<Product>)> {
        let _gate = self.write_gate.lock();
        let txn = self.storage.begin_write()?;
        let Some(removed) = self.storage.delete(&txn, id)? else {
            return Err(AppError::product_not_found(id));
        };
        let remaining = self.storage.load_all_in(&txn)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(product_id = id, "Product deleted");
        self.notifier.notify(SyncAction::Deleted, Some(id), remaining.clone());
        Ok((removed, remaining))
    }

    /// Broadcast the current catalog without changing it
    pub fn refresh(&self) -> AppResult<()> {
        let _gate = self.write_gate.lock();
        let products = self.storage.load_all()?;
        self.notifier.notify(SyncAction::Refreshed, None, products);
        Ok(())
    }
}

/// Run a blocking catalog call on tokio's blocking pool
pub async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Catalog task join error: {e}");
        AppError::internal("Catalog task failed")
    })?
}
