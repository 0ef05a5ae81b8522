use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{get_config_folder, APP_NAME};

const LOG_FILE_NAME: &str = "notekeeper.log";

/// Overrides the filter built from the `debug` setting.
pub const LOG_FILTER_ENV: &str = "NOTEKEEPER_LOG";

/// Returns the path to the log file
pub fn get_log_file_path() -> PathBuf {
    log_file_in(&get_config_folder())
}

fn log_file_in(folder: &Path) -> PathBuf {
    folder.join(LOG_FILE_NAME)
}

/// Filter directives used when `NOTEKEEPER_LOG` is not set.
///
/// Dependencies only log warnings, the `debug` setting only raises our own
/// verbosity.
pub fn default_filter(debug: bool) -> String {
    let own_level = if debug { "debug" } else { "info" };
    format!("warn,{APP_NAME}={own_level}")
}

/// Logs to `notekeeper.log` in the config folder and to stderr.
/// The returned guard flushes the file on drop, keep it alive until exit.
pub fn init_logging(debug: bool) -> WorkerGuard {
    let log_folder = get_config_folder();
    let _ = std::fs::create_dir_all(&log_folder);

    let file_appender = tracing_appender::rolling::never(&log_folder, LOG_FILE_NAME);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        log_path = %log_file_in(&log_folder).display(),
        "Logging to file"
    );

    guard
}
