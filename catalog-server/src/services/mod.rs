//! Services layered around the catalog
//!
//! - [`app`] - router assembly and middleware

pub mod app;

pub use app::{build_app, build_service};
