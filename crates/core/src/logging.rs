//! Process-wide tracing setup.
//!
//! Each component writes to its own daily-rotated file under the configured
//! log directory. `RUST_LOG` wins over the configured filter when it parses.

use crate::config::CodeNavConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const FALLBACK_FILTER: &str = "info";

/// Picks the first directive that parses: `RUST_LOG`, then the configured
/// filter, then `info`.
pub fn filter_directive(configured: &str, rust_log: Option<&str>) -> String {
    rust_log
        .into_iter()
        .chain(std::iter::once(configured))
        .find(|directive| !directive.trim().is_empty() && EnvFilter::try_new(directive).is_ok())
        .unwrap_or(FALLBACK_FILTER)
        .to_string()
}

/// `codenav-query.2026-10-16.log` for the `query` component.
pub fn log_file_prefix(component: &str) -> String {
    format!("codenav-{component}")
}

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
///
/// Returns `None` when the log directory cannot be used; stderr output, if
/// requested, is still installed.
pub fn init_logging(config: &CodeNavConfig, component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(&config.log_filter, rust_log.as_deref());

    let appender = std::fs::create_dir_all(&config.log_dir)
        .map_err(|err| err.to_string())
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(log_file_prefix(component))
                .filename_suffix("log")
                .max_log_files(config.log_max_files.max(1))
                .build(&config.log_dir)
                .map_err(|err| err.to_string())
        });

    let (file_layer, guard) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Err(err) => {
            eprintln!(
                "codenav: file logging disabled for {}: {}",
                config.log_dir.display(),
                err
            );
            (None, None)
        }
    };

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(&directive))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }

    guard
}
