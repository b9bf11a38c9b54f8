use super::text_width::titled_rule;
use crate::render::fragment::header_style;
use crate::render::RenderedFragment;
use crossterm::{
    queue,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Line,
};
use std::io::{self, Write};

/// Write one fragment as terminal lines.
///
/// With `colored` off only the text is written, which keeps piped output
/// free of escape sequences.
pub fn write_fragment<W: Write>(
    out: &mut W,
    fragment: &RenderedFragment,
    width: u16,
    colored: bool,
) -> io::Result<()> {
    let mut lines = fragment.to_lines();
    if let (Some(header), Some(first)) = (fragment.header(), lines.first_mut()) {
        *first = Line::styled(titled_rule(Some(header), width as usize), header_style());
    }

    for line in &lines {
        write_line(out, line, colored)?;
    }
    Ok(())
}

fn write_line<W: Write>(out: &mut W, line: &Line<'_>, colored: bool) -> io::Result<()> {
    for span in &line.spans {
        if colored {
            let style = line.style.patch(span.style);
            apply_style(out, style)?;
            queue!(out, Print(span.content.as_ref()))?;
            queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        } else {
            queue!(out, Print(span.content.as_ref()))?;
        }
    }
    queue!(out, Print("\n"))
}

fn apply_style<W: Write>(out: &mut W, style: Style) -> io::Result<()> {
    if let Some(color) = style.fg.and_then(to_term_color) {
        queue!(out, SetForegroundColor(color))?;
    }
    let modifiers = [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
    ];
    for (modifier, attribute) in modifiers {
        if style.add_modifier.contains(modifier) {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

fn to_term_color(color: Color) -> Option<TermColor> {
    Some(match color {
        Color::Reset => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(index) => TermColor::AnsiValue(index),
    })
}
