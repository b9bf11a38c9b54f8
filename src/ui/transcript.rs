use super::ansi::write_fragment;
use crate::logging;
use crate::render::{Highlight, ToolOutputRenderer};
use crate::types::TranscriptEvent;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::Write;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

pub const MAX_EVENT_LINE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptSummary {
    pub rendered: usize,
    /// Unparseable, oversized, or rejected lines.
    pub failed: usize,
}

/// Render every JSONL event read from `input` into `out`.
///
/// A bad line is logged and counted, never fatal. Only read and write
/// failures end the run early.
pub async fn run_transcript<R, W, H>(
    renderer: &mut ToolOutputRenderer<H>,
    input: R,
    out: &mut W,
    width: u16,
    colored: bool,
    max_line_bytes: usize,
) -> Result<TranscriptSummary>
where
    R: AsyncRead + Unpin,
    W: Write,
    H: Highlight,
{
    let mut lines = FramedRead::new(input, LinesCodec::new_with_max_length(max_line_bytes));
    let mut summary = TranscriptSummary::default();
    let mut line_number = 0usize;
    let mut after_codec_error = false;

    loop {
        let line = match lines.next().await {
            Some(line) => line,
            // FramedRead ends the stream once after a decode error; reading resumes on the next poll.
            None if after_codec_error => {
                after_codec_error = false;
                continue;
            }
            None => break,
        };
        after_codec_error = false;
        line_number += 1;

        let line = match line {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                tracing::warn!(line = line_number, max_bytes = max_line_bytes, "skipping oversized event line");
                summary.failed += 1;
                after_codec_error = true;
                continue;
            }
            Err(LinesCodecError::Io(err)) => {
                return Err(err).context("failed to read transcript events");
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let event: TranscriptEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                logging::emit_event_parse_error(line_number, &line, &err);
                summary.failed += 1;
                continue;
            }
        };
        logging::emit_debug_event(&event);

        match renderer.render_event(&event) {
            Ok(fragment) => {
                write_fragment(out, &fragment, width, colored)
                    .and_then(|()| out.flush())
                    .context("failed to write rendered event")?;
                summary.rendered += 1;
            }
            Err(err) => {
                tracing::error!(line = line_number, error = %err, "failed to render transcript event");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        rendered = summary.rendered,
        failed = summary.failed,
        active_tools = renderer.active_tools().len(),
        "transcript finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DisplayZone, PlainHighlighter, TimeOfDayFormatter};

    fn renderer() -> ToolOutputRenderer<PlainHighlighter> {
        ToolOutputRenderer::new(
            PlainHighlighter,
            TimeOfDayFormatter::new(DisplayZone::Utc, "%H:%M:%S"),
        )
    }

    #[tokio::test]
    async fn test_bad_lines_are_counted_and_skipped() {
        let input = concat!(
            "not json at all\n",
            "\n",
            "{\"type\":\"tool_start\",\"name\":\"  \",\"input\":{}}\n",
            "{\"type\":\"tool_start\",\"name\":\"search\",\"input\":{\"query\":\"cats\"},\"timestamp\":\"2024-05-01T13:04:05Z\"}\n",
        );
        let mut renderer = renderer();
        let mut out = Vec::new();

        let summary = run_transcript(&mut renderer, input.as_bytes(), &mut out, 24, false, 1024)
            .await
            .expect("transcript runs");

        assert_eq!(summary, TranscriptSummary { rendered: 1, failed: 2 });
        assert_eq!(
            String::from_utf8(out).expect("utf8 output"),
            "─ Tool: search ─────────\n{\n  \"query\": \"cats\"\n}\n13:04:05\n"
        );
        assert_eq!(renderer.active_tools().names(), vec!["search"]);
    }

    #[tokio::test]
    async fn test_oversized_line_does_not_stop_the_stream() {
        let input = format!(
            "{}\n{{\"type\":\"tool_result\",\"data\":\"{}\"}}\n{}\n",
            r#"{"type":"tool_result","data":"first"}"#,
            "x".repeat(200),
            r#"{"type":"tool_result","data":"second"}"#,
        );
        let mut renderer = renderer();
        let mut out = Vec::new();

        let summary = run_transcript(&mut renderer, input.as_bytes(), &mut out, 24, false, 64)
            .await
            .expect("transcript runs");

        assert_eq!(summary, TranscriptSummary { rendered: 2, failed: 1 });
        assert_eq!(String::from_utf8(out).expect("utf8 output"), "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_result_retires_matching_start() {
        let input = concat!(
            "{\"type\":\"tool_start\",\"name\":\"ls\",\"input\":{},\"id\":\"call-1\"}\n",
            "{\"type\":\"tool_result\",\"data\":\"ok\",\"tool_name\":\"ls\",\"tool_call_id\":\"call-1\"}",
        );
        let mut renderer = renderer();
        let mut out = Vec::new();

        let summary = run_transcript(&mut renderer, input.as_bytes(), &mut out, 24, false, 1024)
            .await
            .expect("transcript runs");

        assert_eq!(summary, TranscriptSummary { rendered: 2, failed: 0 });
        assert!(renderer.active_tools().is_empty());
        assert!(String::from_utf8(out).expect("utf8 output").ends_with("ok\n"));
    }
}
