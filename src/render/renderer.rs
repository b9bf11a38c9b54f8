use super::code_block::split_code_blocks;
use super::fragment::{CodeBlock, RenderedFragment, Segment};
use super::highlight::{BoxedHighlighter, Highlight, PlainHighlighter, SyntectHighlighter};
use super::payload::{payload_text, pretty_json, to_payload_value, PayloadText};
use super::timestamp::{DisplayZone, TimeOfDayFormatter};
use crate::config::RendererConfig;
use crate::error::{RenderError, RenderResult};
use crate::state::{ActiveTool, ActiveToolIndex};
use crate::types::{ToolInvocationEvent, ToolResultEvent, TranscriptEvent};
use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;

/// Result fragment plus the index entry it retired, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTool {
    pub fragment: RenderedFragment,
    pub retired: Option<ActiveTool>,
}

/// Turns tool transcript events into detached fragments and tracks the
/// in-flight invocation fragment for each tool name.
pub struct ToolOutputRenderer<H = BoxedHighlighter> {
    active_tools: ActiveToolIndex,
    highlighter: H,
    clock: TimeOfDayFormatter,
}

impl ToolOutputRenderer {
    pub fn from_config(config: &RendererConfig) -> Result<Self> {
        let zone = DisplayZone::parse(&config.timezone)
            .ok_or_else(|| anyhow!("invalid timezone '{}'", config.timezone))?;
        let clock = TimeOfDayFormatter::new(zone, config.time_format.clone());

        let highlighter: BoxedHighlighter = if config.highlight {
            let syntect = SyntectHighlighter::with_theme(&config.theme)
                .ok_or_else(|| anyhow!("unknown highlight theme '{}'", config.theme))?;
            Box::new(syntect)
        } else {
            Box::new(PlainHighlighter)
        };

        Ok(Self::new(highlighter, clock)
            .with_active_tools(ActiveToolIndex::with_max_entries(config.max_active_tools)))
    }
}

impl<H: Highlight> ToolOutputRenderer<H> {
    pub fn new(highlighter: H, clock: TimeOfDayFormatter) -> Self {
        Self {
            active_tools: ActiveToolIndex::default(),
            highlighter,
            clock,
        }
    }

    pub fn with_active_tools(mut self, active_tools: ActiveToolIndex) -> Self {
        self.active_tools = active_tools;
        self
    }

    pub fn active_tools(&self) -> &ActiveToolIndex {
        &self.active_tools
    }

    pub fn active_tools_mut(&mut self) -> &mut ActiveToolIndex {
        &mut self.active_tools
    }

    /// Render a "tool started" line and index it under the tool name.
    ///
    /// Nothing is indexed when the call fails.
    pub fn handle_tool_start<I: Serialize>(
        &mut self,
        event: &ToolInvocationEvent<I>,
    ) -> RenderResult<RenderedFragment> {
        if event.name.trim().is_empty() {
            return Err(RenderError::MissingIdentifier);
        }

        let input = to_payload_value(&event.input)?;
        let body = pretty_json(&input)?;
        let fragment = RenderedFragment::invocation(
            format!("Tool: {}", event.name),
            vec![Segment::Code(CodeBlock::json(body))],
            self.clock.format(&event.timestamp),
        );

        let replaced = self
            .active_tools
            .record(&event.name, event.id.clone(), fragment.clone());
        tracing::debug!(
            tool = %event.name,
            call_id = event.id.as_deref().unwrap_or("<none>"),
            replaced = replaced.is_some(),
            "indexed tool invocation"
        );
        Ok(fragment)
    }

    /// Render a tool result. Does not touch the active tool index.
    pub fn handle_tool_result<D: Serialize>(
        &self,
        result: &ToolResultEvent<D>,
    ) -> RenderResult<RenderedFragment> {
        let data = to_payload_value(&result.data)?;
        let segments = result_segments(&data)?;
        let fragment = RenderedFragment::result(segments);

        if fragment.has_code_block() {
            Ok(self.highlighter.highlight(fragment))
        } else {
            Ok(fragment)
        }
    }

    /// Render a result and retire the invocation it answers, when the
    /// result names its tool.
    pub fn complete_tool<D: Serialize>(
        &mut self,
        result: &ToolResultEvent<D>,
    ) -> RenderResult<CompletedTool> {
        let fragment = self.handle_tool_result(result)?;
        let retired = result.tool_name.as_deref().and_then(|name| {
            self.active_tools
                .remove_matching(name, result.tool_call_id.as_deref())
        });
        if let (Some(name), None) = (result.tool_name.as_deref(), retired.as_ref()) {
            tracing::debug!(tool = %name, "tool result did not match an active invocation");
        }
        Ok(CompletedTool { fragment, retired })
    }

    pub fn render_event(&mut self, event: &TranscriptEvent) -> RenderResult<RenderedFragment> {
        match event {
            TranscriptEvent::ToolStart(start) => self.handle_tool_start(start),
            TranscriptEvent::ToolResult(result) if result.tool_name.is_some() => {
                self.complete_tool(result).map(|completed| completed.fragment)
            }
            TranscriptEvent::ToolResult(result) => self.handle_tool_result(result),
        }
    }
}

fn result_segments(data: &Value) -> RenderResult<Vec<Segment>> {
    Ok(match payload_text(data)? {
        PayloadText::Structured(pretty) => vec![Segment::Code(CodeBlock::json(pretty))],
        PayloadText::Plain(text) => split_code_blocks(&text),
    })
}
