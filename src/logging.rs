//! Tracing setup for the server and the command-line tool.
//!
//! The server writes compact lines to stdout and mirrors them, without ANSI colour, into a log
//! file: `DOCSUM_LOG_FILE` when set, `logs/docsum.log` otherwise. The CLI writes to stderr only
//! so stdout stays reserved for the JSON result.
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "DOCSUM_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_NAME: &str = "docsum.log";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where the server's file log goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    /// Explicit path from the environment; appended to.
    Explicit(PathBuf),
    /// `logs/docsum.log` relative to the working directory.
    Default,
}

impl LogTarget {
    fn from_env_value(value: Option<String>) -> Self {
        match value {
            Some(path) if !path.trim().is_empty() => Self::Explicit(PathBuf::from(path.trim())),
            _ => Self::Default,
        }
    }

    fn open(&self) -> io::Result<NonBlocking> {
        let (writer, guard) = match self {
            Self::Explicit(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                tracing_appender::non_blocking(file)
            }
            Self::Default => {
                fs::create_dir_all(DEFAULT_LOG_DIR)?;
                tracing_appender::non_blocking(tracing_appender::rolling::never(
                    DEFAULT_LOG_DIR,
                    DEFAULT_LOG_NAME,
                ))
            }
        };
        let _ = FILE_GUARD.set(guard);
        Ok(writer)
    }

    fn display(&self) -> PathBuf {
        match self {
            Self::Explicit(path) => path.clone(),
            Self::Default => Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_NAME),
        }
    }
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the server subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// A log file that cannot be opened is reported on stderr and skipped; stdout logging still
/// works.
pub fn init_tracing() {
    let target = LogTarget::from_env_value(std::env::var(LOG_FILE_ENV).ok());
    let file_layer = match target.open() {
        Ok(writer) => Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact(),
        ),
        Err(err) => {
            eprintln!("Log file {} unavailable: {err}", target.display().display());
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter_or("info"))
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Install a stderr-only subscriber for command-line use. Defaults to `warn`.
pub fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(filter_or("warn"))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_missing_path_uses_default_file() {
        assert_eq!(LogTarget::from_env_value(None), LogTarget::Default);
        assert_eq!(LogTarget::from_env_value(Some("  ".into())), LogTarget::Default);
        assert_eq!(
            LogTarget::Default.display(),
            PathBuf::from("logs").join("docsum.log")
        );
    }

    #[test]
    fn explicit_path_is_trimmed() {
        assert_eq!(
            LogTarget::from_env_value(Some(" /tmp/docsum.log ".into())),
            LogTarget::Explicit(PathBuf::from("/tmp/docsum.log"))
        );
    }

    #[test]
    fn explicit_file_is_created_on_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        LogTarget::Explicit(path.clone()).open().expect("writer");
        assert!(path.exists());
    }
}
