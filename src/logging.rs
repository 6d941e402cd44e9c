//! Logging setup and the per-request operation log
//!
//! Three sinks: the console (filtered by `RUST_LOG`), a combined JSON log
//! with every entry at info and above, and an error-only JSON log. File
//! writes go through non-blocking workers owned by [`LogGuard`]; dropping
//! the guard flushes whatever is still queued.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::calc::CalcError;
use crate::config::LogConfig;
use crate::error::{Error, Result};
use crate::types::{Operands, Operation};

/// Keeps the file writers alive. Hold it for the lifetime of the process.
#[must_use = "dropping the guard stops the log file writers"]
pub struct LogGuard {
    _workers: Vec<WorkerGuard>,
}

/// Console filter: `RUST_LOG` if set, otherwise info (or debug) for this crate
pub fn console_filter(verbose: bool) -> EnvFilter {
    let log_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("calculator_service={},tower_http=debug", log_level).into())
}

/// Build the full subscriber without installing it.
pub fn build(config: &LogConfig, verbose: bool) -> Result<(Box<dyn Subscriber + Send + Sync>, LogGuard)> {
    std::fs::create_dir_all(&config.dir)?;

    let (combined, combined_worker) =
        tracing_appender::non_blocking(open_appender(&config.dir, &config.combined_file)?);
    let (errors, error_worker) =
        tracing_appender::non_blocking(open_appender(&config.dir, &config.error_file)?);

    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter(verbose)))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(combined)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(errors)
                .with_filter(LevelFilter::ERROR),
        );

    let subscriber: Box<dyn Subscriber + Send + Sync> = Box::new(subscriber);
    let guard = LogGuard {
        _workers: vec![combined_worker, error_worker],
    };
    Ok((subscriber, guard))
}

/// Install console and file logging as the global subscriber.
pub fn init(config: &LogConfig, verbose: bool) -> Result<LogGuard> {
    let (subscriber, guard) = build(config, verbose)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Logging(e.to_string()))?;
    Ok(guard)
}

/// Console-only logging for one-shot CLI commands
pub fn init_console(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter(verbose)))
        .init();
}

// Append-only, never rotated
fn open_appender(dir: &Path, file: &str) -> Result<RollingFileAppender> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file)
        .build(dir)?;
    Ok(appender)
}

/// Handle handed to request handlers for recording operations.
///
/// Every entry carries the `service` name so combined logs from several
/// instances stay attributable.
#[derive(Debug, Clone)]
pub struct OperationLog {
    service: Arc<str>,
}

impl OperationLog {
    pub fn new(service: impl Into<Arc<str>>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn requested(&self, op: Operation, operands: &Operands) {
        info!(
            service = %self.service,
            operation = %op,
            "New {} operation requested: {}",
            op.noun(),
            op.describe(operands)
        );
    }

    pub fn rejected(&self, op: Operation, operands: &Operands, err: CalcError) {
        error!(
            service = %self.service,
            operation = %op,
            kind = ?err.kind(),
            "{} error: {} - {}",
            op.label(),
            err.reason(),
            operands
        );
    }

    pub fn invalid_endpoint(&self, uri: &str) {
        error!(service = %self.service, "Invalid endpoint accessed: {}", uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).expect("log line should be JSON"))
            .collect()
    }

    fn message(entry: &serde_json::Value) -> &str {
        entry["fields"]["message"].as_str().unwrap()
    }

    #[test]
    fn test_files_split_by_level() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            dir: dir.path().join("logs"),
            ..LogConfig::default()
        };

        let (subscriber, guard) = build(&config, false).unwrap();
        let log = OperationLog::new("calc-test");

        tracing::subscriber::with_default(subscriber, || {
            log.requested(Operation::Add, &Operands::binary("2", "3"));
            log.rejected(
                Operation::Divide,
                &Operands::binary("10", "0"),
                CalcError::DivisionByZero,
            );
            log.invalid_endpoint("/nonexistent?x=1");
        });
        drop(guard);

        let combined = read_lines(&config.combined_path());
        let errors = read_lines(&config.error_path());

        let combined_messages: Vec<_> = combined.iter().map(message).collect();
        assert_eq!(
            combined_messages,
            vec![
                "New addition operation requested: 2 + 3",
                "Division error: Division by zero - num1=10, num2=0",
                "Invalid endpoint accessed: /nonexistent?x=1",
            ]
        );

        let error_messages: Vec<_> = errors.iter().map(message).collect();
        assert_eq!(
            error_messages,
            vec![
                "Division error: Division by zero - num1=10, num2=0",
                "Invalid endpoint accessed: /nonexistent?x=1",
            ]
        );

        for entry in &combined {
            assert_eq!(entry["fields"]["service"], "calc-test");
        }
        assert_eq!(combined[0]["level"], "INFO");
        assert_eq!(combined[0]["fields"]["operation"], "add");
        assert_eq!(errors[0]["level"], "ERROR");
    }

    #[test]
    fn test_files_are_appended_across_runs() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            dir: dir.path().to_path_buf(),
            ..LogConfig::default()
        };
        let log = OperationLog::new("calc-test");

        for _ in 0..2 {
            let (subscriber, guard) = build(&config, false).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                log.requested(Operation::Sqrt, &Operands::unary("9"));
            });
            drop(guard);
        }

        let combined = read_lines(&config.combined_path());
        assert_eq!(combined.len(), 2);
        assert_eq!(message(&combined[1]), "New square root operation requested: √9");
        assert!(read_lines(&config.error_path()).is_empty());
    }
}
