//! Logging initialization: human-readable (or JSON) lines to stdout and an optional log file.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::{
    fmt::format::{FmtSpan, Writer},
    fmt::time::FormatTime,
    fmt::writer::{BoxMakeWriter, MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Operator-facing log level. Matches .env `LOG_LEVEL`: DEBUG | INFO | WARNING | ERROR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name case-insensitively. `WARN` is accepted for `WARNING`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    /// Canonical .env spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// `EnvFilter` directive for this level.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how log lines are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    pub level: LogLevel,
    /// LOG_FILE; `None` logs to stdout only.
    pub file: Option<PathBuf>,
    /// LOG_JSON
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            json: false,
        }
    }
}

/// Local time in `YYYY-MM-DD HH:MM:SS` for human-readable log lines.
struct ChronoLocal;

impl FormatTime for ChronoLocal {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let t = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(w, "{} ", t)
    }
}

/// Opens (creating parent directories) the log file and tees it with stdout.
fn make_writer(settings: &LogSettings) -> io::Result<BoxMakeWriter> {
    let Some(path) = settings.file.as_deref() else {
        return Ok(BoxMakeWriter::new(io::stdout));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(io::stdout.and(Arc::new(file))))
}

/// Initializes the global tracing subscriber.
///
/// Output is `YYYY-MM-DD HH:MM:SS LEVEL [target] message key=value ...` (or one JSON object per
/// line when `json` is set), teed to stdout and the log file. No ANSI codes so the log file is
/// plain text. `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(settings: &LogSettings) -> anyhow::Result<()> {
    let writer = make_writer(settings)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_filter()));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(ChronoLocal)
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    } else {
        let event_format = tracing_subscriber::fmt::format()
            .with_timer(ChronoLocal)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(false);
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .event_format(event_format)
            .with_span_events(FmtSpan::NONE)
            .with_ansi(false)
            .boxed()
    };

    Registry::default()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
