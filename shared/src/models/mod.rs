//! Data models shared between server and clients

pub mod product;

pub use product::{Product, ProductCreate, ProductUpdate};
