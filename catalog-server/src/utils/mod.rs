//! Utilities
//!
//! - [`AppError`] / [`ErrorBody`] - error type and its JSON body (from shared::error)
//! - [`logger`] - tracing setup

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
