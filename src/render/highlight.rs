//! Syntax highlighting for code blocks inside rendered fragments.
//!
//! Highlighting is a pure pass over a finished fragment: it attaches styled
//! lines to each [`CodeBlock`] and never edits the code text, so
//! `body_text()` is identical before and after.

use super::fragment::{CodeBlock, RenderedFragment};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::sync::OnceLock;
use syntect::{
    easy::HighlightLines,
    highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

pub trait Highlight {
    fn highlight(&self, fragment: RenderedFragment) -> RenderedFragment;
}

impl<H: Highlight + ?Sized> Highlight for Box<H> {
    fn highlight(&self, fragment: RenderedFragment) -> RenderedFragment {
        (**self).highlight(fragment)
    }
}

pub type BoxedHighlighter = Box<dyn Highlight + Send + Sync>;

/// Leaves fragments untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlight for PlainHighlighter {
    fn highlight(&self, fragment: RenderedFragment) -> RenderedFragment {
        fragment
    }
}

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

pub fn theme_exists(name: &str) -> bool {
    theme_set().themes.contains_key(name)
}

pub fn available_themes() -> Vec<&'static str> {
    theme_set().themes.keys().map(String::as_str).collect()
}

#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: Theme,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        let themes = &theme_set().themes;
        let theme = themes
            .get(DEFAULT_THEME)
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default();
        Self { theme }
    }
}

impl SyntectHighlighter {
    /// Returns `None` when the theme is not bundled with syntect.
    pub fn with_theme(name: &str) -> Option<Self> {
        theme_set()
            .themes
            .get(name)
            .cloned()
            .map(|theme| Self { theme })
    }

    fn resolve_syntax(&self, language: Option<&str>) -> &'static SyntaxReference {
        let syntaxes = syntax_set();
        let Some(language) = language else {
            return syntaxes.find_syntax_plain_text();
        };

        let lower = language.to_ascii_lowercase();
        let token = match lower.as_str() {
            "js" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "rb" => "ruby",
            "rs" => "rust",
            "sh" | "bash" | "zsh" | "shell" => "Bourne Again Shell (bash)",
            "yml" => "yaml",
            "md" => "markdown",
            "c++" => "cpp",
            other => other,
        };

        syntaxes
            .find_syntax_by_token(token)
            .or_else(|| syntaxes.find_syntax_by_extension(&lower))
            .or_else(|| syntaxes.find_syntax_by_name(language))
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
    }

    pub fn highlight_code(&self, code: &str, language: Option<&str>) -> Vec<Line<'static>> {
        let syntaxes = syntax_set();
        let mut highlighter = HighlightLines::new(self.resolve_syntax(language), &self.theme);

        LinesWithEndings::from(code)
            .map(|line| match highlighter.highlight_line(line, syntaxes) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .filter_map(|(style, text)| styled_span(style, text))
                        .collect::<Vec<_>>(),
                ),
                Err(err) => {
                    tracing::debug!(error = %err, "syntax highlighting failed for line");
                    Line::from(strip_newline(line).to_string())
                }
            })
            .collect()
    }

    fn highlight_block(&self, block: &mut CodeBlock) {
        let lines = self.highlight_code(block.code(), block.language());
        block.set_highlighted(lines);
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, mut fragment: RenderedFragment) -> RenderedFragment {
        for block in fragment.code_blocks_mut() {
            self.highlight_block(block);
        }
        fragment
    }
}

fn strip_newline(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

fn styled_span(style: SyntectStyle, text: &str) -> Option<Span<'static>> {
    let text = strip_newline(text);
    if text.is_empty() {
        return None;
    }
    Some(Span::styled(text.to_string(), to_ratatui_style(style)))
}

fn to_ratatui_style(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::code_block::split_code_blocks;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_default_theme_is_bundled() {
        assert!(theme_exists(DEFAULT_THEME));
        assert!(SyntectHighlighter::with_theme(DEFAULT_THEME).is_some());
        assert!(SyntectHighlighter::with_theme("no-such-theme").is_none());
    }

    #[test]
    fn test_highlight_code_keeps_line_text() {
        let highlighter = SyntectHighlighter::default();
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let lines = highlighter.highlight_code(code, Some("rs"));

        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["fn main() {", "    println!(\"hi\");", "}"]);
        assert!(lines[0]
            .spans
            .iter()
            .all(|span| matches!(span.style.fg, Some(Color::Rgb(..)))));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let highlighter = SyntectHighlighter::default();
        let lines = highlighter.highlight_code("just words\n", Some("klingon"));
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "just words");
    }

    #[test]
    fn test_highlight_pass_preserves_body_text() {
        let text = "output:\n```json\n{\"ok\": true}\n```\n";
        let fragment = RenderedFragment::result(split_code_blocks(text));

        let highlighted = SyntectHighlighter::default().highlight(fragment.clone());
        assert!(highlighted.is_highlighted());
        assert_eq!(highlighted.body_text(), fragment.body_text());

        let untouched = PlainHighlighter.highlight(fragment.clone());
        assert_eq!(untouched, fragment);
    }
}
