//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Assigned by the store, never by the caller
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Not unique; several products may share a code
    pub code: String,
    pub category: String,
    /// Any JSON number, fractional values included
    #[serde(with = "rust_decimal::serde::float")]
    pub stock: Decimal,
    pub status: bool,
}

/// Create product payload
///
/// Required fields are optional here so that a missing field surfaces as a
/// validation error naming the field rather than a body rejection. Any
/// `id` or `status` sent by the caller is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub thumbnail: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub stock: Option<Decimal>,
}

/// Update product payload (partial; absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// Accepted only when equal to the target id
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub thumbnail: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub stock: Option<Decimal>,
    pub status: Option<bool>,
}
