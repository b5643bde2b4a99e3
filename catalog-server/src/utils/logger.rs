//! Logging Infrastructure
//!
//! Structured logging for development and production:
//! - Console output, pretty in development and JSON in production
//! - Daily rotating application logs under `{log_dir}/app`
//! - Daily rotating HTTP access logs under `{log_dir}/access`
//! - Rotated files older than [`RETENTION_DAYS`] are deleted hourly

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Target used by the HTTP access-log middleware
pub const ACCESS_TARGET: &str = "http_access";

/// Days a rotated log file is kept
pub const RETENTION_DAYS: i64 = 14;

const APP_PREFIX: &str = "app";
const ACCESS_PREFIX: &str = "access";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// catalog_server::utils::logger::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + files)
/// catalog_server::utils::logger::init_logger_with_file(
///     "info",
///     true,
///     Some(std::path::Path::new("./work_dir/logs")),
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console: BoxedLayer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };
    let mut layers = vec![console];

    if let Some(dir) = log_dir {
        let app_dir = dir.join(APP_PREFIX);
        let access_dir = dir.join(ACCESS_PREFIX);
        fs::create_dir_all(&app_dir)?;
        fs::create_dir_all(&access_dir)?;

        // Everything except access lines
        let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, APP_PREFIX);
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(filter_fn(|meta| meta.target() != ACCESS_TARGET))
                .boxed(),
        );

        let access_log = RollingFileAppender::new(Rotation::DAILY, access_dir, ACCESS_PREFIX);
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(access_log))
                .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET))
                .boxed(),
        );

        tokio::spawn(periodic_cleanup(dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Delete rotated log files older than [`RETENTION_DAYS`]
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = Local::now().date_naive() - chrono::Duration::days(RETENTION_DAYS);
    let mut removed = 0;

    for prefix in [APP_PREFIX, ACCESS_PREFIX] {
        let dir = log_dir.join(prefix);
        if !dir.exists() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(date) = rotated_date(name, prefix)
                && date < cutoff
            {
                fs::remove_file(&path)?;
                tracing::info!(file = %name, "Deleted old log file");
                removed += 1;
            }
        }
    }

    Ok(removed)
}

/// Date of a `{prefix}.YYYY-MM-DD` rotated file
fn rotated_date(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let date_part = file_name.strip_prefix(prefix)?.strip_prefix('.')?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_date() {
        assert_eq!(
            rotated_date("app.2024-03-01", "app"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(rotated_date("app.log", "app"), None);
        assert_eq!(rotated_date("access.2024-03-01", "app"), None);
    }

    #[test]
    fn test_cleanup_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&app_dir).unwrap();

        let today = Local::now().date_naive();
        let old = today - chrono::Duration::days(RETENTION_DAYS + 1);
        let old_file = app_dir.join(format!("app.{}", old.format("%Y-%m-%d")));
        let fresh_file = app_dir.join(format!("app.{}", today.format("%Y-%m-%d")));
        let other_file = app_dir.join("notes.txt");
        for f in [&old_file, &fresh_file, &other_file] {
            fs::write(f, b"x").unwrap();
        }

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert!(!old_file.exists());
        assert!(fresh_file.exists());
        assert!(other_file.exists());
    }
}
