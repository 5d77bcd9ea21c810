//! Logging setup for gymdesk.
//!
//! Events go to stdout and to an append-only log file, as text or as JSON
//! lines. `RUST_LOG` replaces the configured directives when it is set.
//! Credentials never reach a log line: handlers log account ids, and the
//! only user-supplied identifier logged before authentication is the
//! masked email from [`mask_email`].

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::Result;

/// Normalize a configured level name. Unknown names mean `info`.
fn level_name(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Filter directives used when `RUST_LOG` is not set.
///
/// sqlx logs every statement at `info`, which would drown the audit trail.
fn default_directives(level: &str) -> String {
    format!("{},sqlx=warn", level_name(level))
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Open the log file for appending, creating parent directories first.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Initialize logging to both stdout and the configured log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = Arc::new(open_log_file(Path::new(&config.file))?);
    let writer = std::io::stdout.and(log_file);

    let layer = match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(build_filter(&config.level))
        .init();

    Ok(())
}

/// Initialize stdout-only logging, used when the log file cannot be opened.
pub fn init_console_only(config: &LoggingConfig) {
    let layer = match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stdout)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(build_filter(&config.level))
        .init();
}

/// Mask an email address for logging: `jane@gym.example` becomes
/// `j***@gym.example`. Input without a domain is masked entirely.
pub fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) if !domain.is_empty() => match local.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => format!("***@{domain}"),
        },
        _ => "***".to_string(),
    }
}
