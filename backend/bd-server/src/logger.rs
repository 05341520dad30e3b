use crate::error::{Result as ServerErrorResult, ServerError};

use bd_config::LoggingConfig;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Record, info};

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Append to a file, plain format
    File(PathBuf),
    /// Stdout with colored levels (TTY)
    Colored,
    /// Plain stdout (systemd, docker logs)
    Plain,
}

impl LogOutput {
    /// `logging.file` wins over the color setting; the file lives in
    /// `logging.dir`, resolved against the config directory.
    pub fn from_config(logging: &LoggingConfig, config_dir: &Path) -> Self {
        match logging.file {
            Some(ref filename) => Self::File(config_dir.join(&logging.dir).join(filename)),
            None if logging.colored => Self::Colored,
            None => Self::Plain,
        }
    }
}

/// Install the global fern logger.
#[track_caller]
pub fn initialize(logging: &LoggingConfig, config_dir: &Path) -> ServerErrorResult<()> {
    let level_filter = logging.level.0;
    let output = LogOutput::from_config(logging, config_dir);

    let colors = (output == LogOutput::Colored).then(|| {
        ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red)
    });

    let formatted = Dispatch::new().format(move |out, message, record| {
        let level = match colors {
            Some(ref colors) => colors.color(record.level()).to_string(),
            None => record.level().to_string(),
        };
        out.finish(format_args!(
            "[{date} - {level}] {message} [{source}]",
            date = humantime::format_rfc3339(SystemTime::now()),
            source = source_of(record),
        ))
    });

    let dispatch = match output {
        LogOutput::File(ref path) => formatted.chain(open_log_file(path)?),
        LogOutput::Colored | LogOutput::Plain => formatted.chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(level_filter)
        .chain(dispatch)
        .apply()
        .map_err(|e| ServerError::logger(format!("Failed to initialize logger: {e}")))?;

    match output {
        LogOutput::File(ref path) => info!(
            "Logger initialized: level={level_filter:?}, file={}",
            path.display()
        ),
        _ => info!("Logger initialized: level={level_filter:?}, stdout"),
    }

    Ok(())
}

#[track_caller]
fn open_log_file(path: &Path) -> ServerErrorResult<std::fs::File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            ServerError::logger(format!(
                "Failed to create log directory {}: {e}",
                dir.display()
            ))
        })?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ServerError::logger(format!("Failed to open log file {}: {e}", path.display()))
        })
}

/// `file:line` for our own records, the target for forwarded server output.
pub fn source_of(record: &Record) -> String {
    if record.target() == bd_supervisor::SERVER_LOG_TARGET {
        return record.target().to_string();
    }

    format!(
        "{}:{}",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0)
    )
}
