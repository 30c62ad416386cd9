//! Log sinks.
//!
//! Each process invocation writes one log file,
//! `<logs_dir>/pdf_processing_<timestamp>.log`, with lines of the form
//! `timestamp - LEVEL - message`. Console output goes to stderr and honors
//! `RUST_LOG`.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Config;
use crate::error::{PdfinatorError, Result};

/// Name of the log file for an invocation started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("pdf_processing_{}.log", started.format("%Y-%m-%d_%H-%M-%S"))
}

/// Plain `timestamp - LEVEL - message` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Console filter: `RUST_LOG` if set, otherwise derived from verbosity.
pub fn console_filter(config: &Config) -> EnvFilter {
    let default = if config.quiet {
        "error"
    } else if config.verbose {
        "debug"
    } else {
        "warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the file and console sinks as the global subscriber.
///
/// Returns the path of the log file.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global subscriber
/// is already installed.
pub fn init(config: &Config) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.logs_dir)?;

    let path = config.logs_dir.join(log_file_name(Local::now()));
    let file = std::fs::File::create(&path).map_err(|source| {
        PdfinatorError::FailedToCreateOutput {
            path: path.clone(),
            source,
        }
    })?;

    let file_level = if config.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(file_level);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(config));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| PdfinatorError::other(format!("Failed to install logger: {e}")))?;

    Ok(path)
}
