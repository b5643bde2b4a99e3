//! Catalog Server - product catalog with real-time snapshot broadcast
//!
//! # Overview
//!
//! - **Catalog** (`catalog`): redb-backed product store with validated CRUD
//! - **Message bus** (`message`): change notifier and snapshot fan-out
//! - **HTTP API** (`api`): REST endpoints and the WebSocket feed
//!
//! # Layout
//!
//! ```text
//! catalog-server/src/
//! ├── core/          # config, state, server, errors
//! ├── catalog/       # storage, validation, service
//! ├── message/       # bus, notifier, client request handler
//! ├── services/      # router assembly and middleware
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, re-exported error types
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod message;
pub mod services;
pub mod utils;

pub use catalog::{CatalogService, ProductStorage};
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, EventType, MessageBus};
pub use utils::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// Initialize logging from the configuration and prune old log files
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    let log_dir = config.log_to_file.then(|| config.log_dir());
    init_logger_with_file(&config.log_level, config.log_json, log_dir.as_deref())?;

    if let Some(dir) = &log_dir
        && let Err(e) = cleanup_old_logs(dir)
    {
        tracing::warn!(error = %e, "Initial log cleanup failed");
    }
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______      __        __
  / ____/___ _/ /_____ _/ /___  ____ _
 / /   / __ `/ __/ __ `/ / __ \/ __ `/
/ /___/ /_/ / /_/ /_/ / / /_/ / /_/ /
\____/\__,_/\__/\__,_/_/\____/\__, /
                             /____/
    "#
    );
}
