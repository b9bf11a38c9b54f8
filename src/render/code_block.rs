use super::fragment::{CodeBlock, Fence, Segment};
use aho_corasick::AhoCorasick;
use std::sync::OnceLock;

const MIN_FENCE_LEN: usize = 3;
const MAX_FENCE_INDENT: usize = 3;

fn fence_markers() -> Option<&'static AhoCorasick> {
    static MARKERS: OnceLock<Option<AhoCorasick>> = OnceLock::new();
    MARKERS
        .get_or_init(|| AhoCorasick::new(["```", "~~~"]).ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    len: usize,
    language: Option<String>,
}

/// Split text into plain and fenced-code segments.
///
/// Joining the segments back (see `RenderedFragment::body_text`) yields the
/// input unchanged. A fence without a closing line stays plain text.
pub fn split_code_blocks(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    if let Some(markers) = fence_markers() {
        if !markers.is_match(text) {
            return vec![Segment::Text(text.to_string())];
        }
    }

    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let Some(open) = parse_fence_open(line) else {
            pending.push_str(line);
            index += 1;
            continue;
        };

        let close_index = lines[index + 1..]
            .iter()
            .position(|candidate| is_fence_close(candidate, open.marker, open.len))
            .map(|offset| index + 1 + offset);
        let Some(close_index) = close_index else {
            pending.push_str(line);
            index += 1;
            continue;
        };

        if !pending.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut pending)));
        }
        let code: String = lines[index + 1..close_index].concat();
        segments.push(Segment::Code(CodeBlock::fenced(
            open.language,
            code,
            Fence {
                open: line.to_string(),
                close: lines[close_index].to_string(),
            },
        )));
        index = close_index + 1;
    }

    if !pending.is_empty() {
        segments.push(Segment::Text(pending));
    }
    segments
}

pub fn contains_code_block(text: &str) -> bool {
    split_code_blocks(text)
        .iter()
        .any(|segment| matches!(segment, Segment::Code(_)))
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

fn strip_fence_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > MAX_FENCE_INDENT {
        return None;
    }
    Some(trimmed)
}

fn parse_fence_open(line: &str) -> Option<OpenFence> {
    let rest = strip_fence_indent(strip_line_ending(line))?;
    let marker = rest.chars().next().filter(|ch| *ch == '`' || *ch == '~')?;
    let len = rest.chars().take_while(|ch| *ch == marker).count();
    if len < MIN_FENCE_LEN {
        return None;
    }

    let info = rest[len * marker.len_utf8()..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(OpenFence {
        marker,
        len,
        language: info.split_whitespace().next().map(str::to_string),
    })
}

fn is_fence_close(line: &str, marker: char, open_len: usize) -> bool {
    let Some(rest) = strip_fence_indent(strip_line_ending(line)) else {
        return false;
    };
    let rest = rest.trim_end();
    let len = rest.chars().take_while(|ch| *ch == marker).count();
    len >= open_len && len == rest.chars().count()
}
