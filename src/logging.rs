use crate::types::TranscriptEvent;
use crate::ui::text_width::truncate_line;
use crate::util::{env_var_trimmed, parse_bool_str};
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

const DEFAULT_LOG_PATH: &str = "/tmp/toolview-debug.log";
const DEFAULT_LOG_FILTER: &str = "info";
const DEBUG_EVENTS_ENV: &str = "TOOLVIEW_DEBUG_EVENTS";
const LOG_PATH_ENV: &str = "TOOLVIEW_LOG_PATH";
const LOG_FILTER_ENV: &str = "TOOLVIEW_LOG";
/// Columns of a rejected line kept in the parse-failure log record.
const MAX_LOGGED_EVENT_WIDTH: usize = 512;

pub fn debug_events_enabled() -> bool {
    env_var_trimmed(DEBUG_EVENTS_ENV)
        .and_then(|v| parse_bool_str(&v))
        .unwrap_or(false)
}

pub fn emit_debug_event(event: &TranscriptEvent) {
    if !debug_events_enabled() {
        return;
    }
    let payload = serde_json::to_string_pretty(event)
        .unwrap_or_else(|_| "<event serialization error>".to_string());
    tracing::debug!(target: "toolview::events", "transcript event\n{payload}");
}

pub fn emit_event_parse_error(line_number: usize, data: &str, parse_error: &serde_json::Error) {
    tracing::warn!(
        line = line_number,
        error = %parse_error,
        bytes = data.len(),
        data = %truncate_line(data, MAX_LOGGED_EVENT_WIDTH),
        "event_parse_failed"
    );
}

/// Install the global subscriber.
///
/// Logs go to `TOOLVIEW_LOG_PATH` when set, to a file in /tmp when stderr is
/// a terminal (so they don't interleave with rendered output), and to stderr
/// otherwise.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match resolve_log_path() {
        Some(path) => {
            let file = open_log_file(Path::new(&path))
                .with_context(|| format!("failed to open log file '{path}'"))?;
            tracing::subscriber::set_global_default(build_subscriber(
                filter,
                Mutex::new(file),
                false,
            ))
            .context("failed to install log subscriber")?;
        }
        None => {
            tracing::subscriber::set_global_default(build_subscriber(
                filter,
                std::io::stderr,
                true,
            ))
            .context("failed to install log subscriber")?;
        }
    }
    Ok(())
}

fn build_subscriber<W>(
    filter: EnvFilter,
    writer: W,
    ansi: bool,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}

fn resolve_log_path() -> Option<String> {
    env_var_trimmed(LOG_PATH_ENV).or_else(|| {
        if std::io::stderr().is_terminal() {
            Some(DEFAULT_LOG_PATH.to_string())
        } else {
            None
        }
    })
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
