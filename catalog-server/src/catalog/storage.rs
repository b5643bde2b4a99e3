//! redb-based storage for product records
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `id` (i64) | JSON-encoded product row | Record set |
//! | `meta` | name (&str) | i64 | Id high-water mark |
//!
//! Ids come from the `last_product_id` counter in `meta`, bumped in the same
//! write transaction that inserts the record. An id is never handed out
//! twice, even after the record holding it is removed. Iterating `products`
//! in key order yields the records in creation order.
//!
//! Rows store `price` and `stock` as decimal strings, so values survive a
//! write/read cycle exactly.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! write is on disk, and a transaction dropped without commit leaves the file
//! untouched.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::Product;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing products: key = product id, value = JSON-serialized row
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Table for store-wide counters
const META_TABLE: TableDefinition<&str, i64> = TableDefinition::new("meta");

/// Highest id ever assigned
const LAST_ID_KEY: &str = "last_product_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted record: id={id}: {reason}")]
    Corrupted { id: i64, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Stored form of a [`Product`]
#[derive(Serialize, Deserialize)]
struct ProductRow {
    id: i64,
    title: String,
    description: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    code: String,
    category: String,
    #[serde(with = "rust_decimal::serde::str")]
    stock: Decimal,
    status: bool,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            price: p.price,
            thumbnail: p.thumbnail.clone(),
            code: p.code.clone(),
            category: p.category.clone(),
            stock: p.stock,
            status: p.status,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            thumbnail: row.thumbnail,
            code: row.code,
            category: row.category,
            stock: row.stock,
            status: row.status,
        }
    }
}

/// Product storage backed by redb
#[derive(Clone)]
pub struct ProductStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for ProductStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStorage").finish_non_exhaustive()
    }
}

impl ProductStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Reads ==========

    /// Load every product in creation order
    pub fn load_all(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        collect_rows(&table)
    }

    /// Get a single product
    pub fn get(&self, id: i64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        let found = table.get(id)?.map(|guard| decode(id, guard.value()));
        found.transpose()
    }

    /// Number of stored products
    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Writes (within transaction) ==========

    /// Reserve the next id and record it as the high-water mark.
    ///
    /// Files written before the counter existed fall back to the highest
    /// stored key.
    pub fn allocate_id(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        let highest_key = {
            let table = txn.open_table(PRODUCTS_TABLE)?;
            let last = table.last()?.map(|(key, _)| key.value());
            last.unwrap_or(0)
        };
        let mut meta = txn.open_table(META_TABLE)?;
        let recorded = meta.get(LAST_ID_KEY)?.map(|guard| guard.value()).unwrap_or(0);

        let id = recorded.max(highest_key) + 1;
        meta.insert(LAST_ID_KEY, id)?;
        Ok(id)
    }

    /// Every product as seen by the transaction, including its own writes
    pub fn load_all_in(&self, txn: &WriteTransaction) -> StorageResult<Vec<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        collect_rows(&table)
    }

    /// Get a product inside a write transaction
    pub fn get_in(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        let found = table.get(id)?.map(|guard| decode(id, guard.value()));
        found.transpose()
    }

    /// Insert or replace a product
    pub fn put(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let bytes = serde_json::to_vec(&ProductRow::from(product))?;
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        table.insert(product.id, bytes.as_slice())?;
        Ok(())
    }

    /// Remove a product, returning it if it existed
    pub fn delete(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Product>> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let removed = table.remove(id)?.map(|guard| decode(id, guard.value()));
        removed.transpose()
    }

    /// Write raw bytes under an id, bypassing encoding
    #[cfg(test)]
    pub(crate) fn put_raw(&self, id: i64, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            table.insert(id, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }
}

fn collect_rows(table: &impl ReadableTable<i64, &'static [u8]>) -> StorageResult<Vec<Product>> {
    let mut products = Vec::with_capacity(table.len()? as usize);
    for entry in table.iter()? {
        let (key, value) = entry?;
        products.push(decode(key.value(), value.value())?);
    }
    Ok(products)
}

fn decode(id: i64, bytes: &[u8]) -> StorageResult<Product> {
    serde_json::from_slice::<ProductRow>(bytes)
        .map(Product::from)
        .map_err(|e| StorageError::Corrupted {
            id,
            reason: e.to_string(),
        })
}
