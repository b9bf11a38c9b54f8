use ratatui::{
    style::{Color, Modifier, Style},
    text::Line,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    ToolInvocation,
    ToolResult,
}

/// Literal opening and closing fence lines, newlines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    language: Option<String>,
    code: String,
    fence: Option<Fence>,
    highlighted: Option<Vec<Line<'static>>>,
}

impl CodeBlock {
    /// An unfenced block holding serialized JSON.
    pub fn json(code: impl Into<String>) -> Self {
        Self {
            language: Some("json".to_string()),
            code: code.into(),
            fence: None,
            highlighted: None,
        }
    }

    pub fn fenced(language: Option<String>, code: impl Into<String>, fence: Fence) -> Self {
        Self {
            language,
            code: code.into(),
            fence: Some(fence),
            highlighted: None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn fence(&self) -> Option<&Fence> {
        self.fence.as_ref()
    }

    pub fn highlighted(&self) -> Option<&[Line<'static>]> {
        self.highlighted.as_deref()
    }

    /// Attach presentation lines. The code itself is never touched.
    pub fn set_highlighted(&mut self, lines: Vec<Line<'static>>) {
        self.highlighted = Some(lines);
    }

    fn source_text(&self) -> String {
        match &self.fence {
            Some(fence) => format!("{}{}{}", fence.open, self.code, fence.close),
            None => self.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code(CodeBlock),
}

/// A detached transcript entry, ready for the caller to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    kind: FragmentKind,
    header: Option<String>,
    segments: Vec<Segment>,
    footer: Option<String>,
}

impl RenderedFragment {
    pub(crate) fn invocation(header: String, segments: Vec<Segment>, footer: String) -> Self {
        Self {
            kind: FragmentKind::ToolInvocation,
            header: Some(header),
            segments,
            footer: Some(footer),
        }
    }

    pub(crate) fn result(segments: Vec<Segment>) -> Self {
        Self {
            kind: FragmentKind::ToolResult,
            header: None,
            segments,
            footer: None,
        }
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The semantic body text, independent of any highlighting.
    pub fn body_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Code(block) => out.push_str(&block.source_text()),
            }
        }
        out
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Code(block) => Some(block),
            Segment::Text(_) => None,
        })
    }

    pub fn code_blocks_mut(&mut self) -> impl Iterator<Item = &mut CodeBlock> {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::Code(block) => Some(block),
            Segment::Text(_) => None,
        })
    }

    pub fn has_code_block(&self) -> bool {
        self.code_blocks().next().is_some()
    }

    pub fn is_highlighted(&self) -> bool {
        self.code_blocks().any(|block| block.highlighted.is_some())
    }

    pub fn to_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if let Some(header) = &self.header {
            lines.push(Line::styled(header.clone(), header_style()));
        }

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => {
                    lines.extend(text.lines().map(|line| Line::from(line.to_string())));
                }
                Segment::Code(block) => push_code_block_lines(&mut lines, block),
            }
        }

        if let Some(footer) = &self.footer {
            lines.push(Line::styled(
                footer.clone(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines
    }
}

pub fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn push_code_block_lines(lines: &mut Vec<Line<'static>>, block: &CodeBlock) {
    let fence_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);

    if let Some(fence) = &block.fence {
        lines.push(Line::styled(
            fence.open.trim_end().to_string(),
            fence_style,
        ));
    }
    match &block.highlighted {
        Some(highlighted) => lines.extend(highlighted.iter().cloned()),
        None => lines.extend(block.code.lines().map(|line| {
            Line::styled(line.to_string(), Style::default().fg(Color::Gray))
        })),
    }
    if let Some(fence) = &block.fence {
        lines.push(Line::styled(
            fence.close.trim_end().to_string(),
            fence_style,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced_rust() -> CodeBlock {
        CodeBlock::fenced(
            Some("rust".to_string()),
            "fn main() {}\n",
            Fence {
                open: "```rust\n".to_string(),
                close: "```".to_string(),
            },
        )
    }

    #[test]
    fn test_body_text_restores_fences() {
        let fragment = RenderedFragment::result(vec![
            Segment::Text("before\n".to_string()),
            Segment::Code(fenced_rust()),
        ]);

        assert_eq!(fragment.body_text(), "before\n```rust\nfn main() {}\n```");
        assert!(fragment.has_code_block());
        assert!(!fragment.is_highlighted());
    }

    #[test]
    fn test_highlighted_lines_do_not_change_body_text() {
        let mut fragment = RenderedFragment::result(vec![Segment::Code(fenced_rust())]);
        let before = fragment.body_text();

        for block in fragment.code_blocks_mut() {
            block.set_highlighted(vec![Line::from("fn main() {}")]);
        }

        assert!(fragment.is_highlighted());
        assert_eq!(fragment.body_text(), before);
    }

    #[test]
    fn test_to_lines_orders_header_body_footer() {
        let fragment = RenderedFragment::invocation(
            "Tool: search".to_string(),
            vec![Segment::Code(CodeBlock::json("{\n  \"query\": \"cats\"\n}"))],
            "1:04:05 PM".to_string(),
        );

        let lines: Vec<String> = fragment
            .to_lines()
            .iter()
            .map(|line| line.to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Tool: search",
                "{",
                "  \"query\": \"cats\"",
                "}",
                "1:04:05 PM"
            ]
        );
    }
}
