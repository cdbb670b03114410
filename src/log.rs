// src/log.rs
use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogOptions;
use crate::error::ConfigError;

/// Install the global subscriber: stderr always, plus a plain-text file when
/// `opts.file` is set. `RUST_LOG` overrides `opts.level`.
///
/// Keep the returned guard alive until exit, or buffered file lines are lost.
pub fn init(opts: &LogOptions) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&opts.level))
        .map_err(|e| ConfigError::Logging(format!("bad log level `{}`: {e}", opts.level)))?;

    let stderr_layer = fmt::layer().compact().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard) = match &opts.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(std::path::Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| ConfigError::Logging(format!("log file `{}` has no file name", path.display())))?;
            fs::create_dir_all(dir)
                .map_err(|e| ConfigError::Logging(format!("cannot create {}: {e}", dir.display())))?;

            let appender = RollingFileAppender::new(Rotation::NEVER, dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}
