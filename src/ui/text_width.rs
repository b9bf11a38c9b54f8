use unicode_width::UnicodeWidthChar;

pub fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_display_width).sum()
}

pub fn truncate_to_display_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = char_display_width(ch);
        if used + ch_width > max_width && used > 0 {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Truncate to `width` columns, marking the cut with "...".
pub fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    if display_width(input) <= width {
        return input.to_string();
    }
    if width < 4 {
        return truncate_to_display_width(input, width);
    }
    let mut out = truncate_to_display_width(input, width - 3);
    out.push_str("...");
    out
}

/// A horizontal rule, optionally carrying a title, exactly `width` columns wide.
pub fn titled_rule(title: Option<&str>, width: usize) -> String {
    let width = width.max(1);
    let Some(title) = title else {
        return "─".repeat(width);
    };
    let label = truncate_line(&format!("─ {title} "), width);
    let used = display_width(&label);
    format!("{label}{}", "─".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_line_respects_wide_chars() {
        assert_eq!(truncate_line("search", 10), "search");
        assert_eq!(truncate_line("read_file_contents", 10), "read_fi...");
        assert_eq!(display_width("日本語"), 6);
        assert_eq!(truncate_line("日本語テキスト", 7), "日本...");
    }

    #[test]
    fn test_titled_rule_fills_width() {
        assert_eq!(titled_rule(None, 4), "────");
        let rule = titled_rule(Some("Tool: search"), 20);
        assert!(rule.starts_with("─ Tool: search "));
        assert_eq!(display_width(&rule), 20);
    }
}
