//! Fixed geometry of the preview card. The face is monospaced, so line
//! breaking only needs character counts.

use crate::og::{HEIGHT, WIDTH};

pub const PADDING: f32 = 40.0;
/// Advance width of one glyph, in em.
pub const ADVANCE: f32 = 0.6;
pub const ASCENT: f32 = 1.048;
pub const DESCENT: f32 = 0.271;

pub const DATE_SIZE: f32 = 30.0;
pub const DATE_LINE_HEIGHT: f32 = 36.0;
pub const DATE_MARGIN: f32 = 24.0;
pub const TITLE_SIZE: f32 = 60.0;
pub const SUBTITLE_SIZE: f32 = 30.0;
/// `leading-snug`
pub const SNUG: f32 = 1.375;
pub const SUBTITLE_OFFSET: f32 = -12.0;
pub const MAX_LINES: usize = 3;

pub const LOGO_WIDTH: f32 = 120.0;
pub const LOGO_HEIGHT: f32 = 60.0;
pub const LABEL_SIZE: f32 = 30.0;
pub const LABEL_GAP: f32 = 8.0;
pub const BORDER: f32 = 1.0;
pub const FOOTER_HEIGHT: f32 = BORDER + PADDING + LOGO_HEIGHT + PADDING;

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// Baseline position.
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub date: Line,
    pub title: Vec<Line>,
    pub subtitle: Vec<Line>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footer {
    pub border_y: f32,
    pub logo_y: f32,
    pub label_x: f32,
    pub label_y: f32,
}

pub fn content_width() -> f32 { WIDTH as f32 - PADDING * 2.0 }

pub fn chars_per_line(font_size: f32) -> usize {
    (content_width() / (font_size * ADVANCE)).floor() as usize
}

/// Greedy word wrap. Words wider than a line are split, and text that does
/// not fit in `max_lines` is cut with an ellipsis.
pub fn wrap(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return vec![];
    }
    let mut lines = Vec::<String>::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let mut chars = word.chars().collect::<Vec<_>>();
        if current_len > 0 && current_len + 1 + chars.len() <= max_chars {
            current.push(' ');
            current.extend(chars.iter());
            current_len += 1 + chars.len();
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while chars.len() > max_chars {
            lines.push(chars.drain(..max_chars).collect());
        }
        current.extend(chars.iter());
        current_len = chars.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let mut kept = last.chars().take(max_chars - 1).collect::<String>();
            kept.truncate(kept.trim_end().len());
            kept.push('…');
            *last = kept;
        }
    }
    lines
}

/// Baseline of text set in a line box starting at `top`.
fn baseline(top: f32, line_height: f32, font_size: f32) -> f32 {
    top + (line_height - (ASCENT + DESCENT) * font_size) / 2.0 + ASCENT * font_size
}

fn stack(lines: Vec<String>, top: f32, font_size: f32) -> Vec<Line> {
    let line_height = font_size * SNUG;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| Line { text, y: baseline(top + i as f32 * line_height, line_height, font_size) })
        .collect()
}

/// Height available to the header block.
fn area() -> f32 { HEIGHT as f32 - FOOTER_HEIGHT - PADDING * 2.0 }

/// Date, title and subtitle stacked and centered vertically above the footer.
/// The subtitle gets only the lines left over once the title is placed.
pub fn header(date: &str, title: &str, subtitle: &str) -> Header {
    let title = wrap(title, chars_per_line(TITLE_SIZE), MAX_LINES);
    let title_height = title.len() as f32 * TITLE_SIZE * SNUG;
    let area = area();
    let remaining = area - DATE_LINE_HEIGHT - DATE_MARGIN - title_height - SUBTITLE_OFFSET;
    let subtitle_lines = (remaining / (SUBTITLE_SIZE * SNUG)).floor().max(0.0) as usize;
    let subtitle = wrap(subtitle, chars_per_line(SUBTITLE_SIZE), subtitle_lines.min(MAX_LINES));
    let subtitle_height = subtitle.len() as f32 * SUBTITLE_SIZE * SNUG;
    let block = DATE_LINE_HEIGHT + DATE_MARGIN + title_height + SUBTITLE_OFFSET + subtitle_height;
    let top = PADDING + ((area - block) / 2.0).max(0.0);

    let date = Line { text: date.to_string(), y: baseline(top, DATE_LINE_HEIGHT, DATE_SIZE) };
    let title_top = top + DATE_LINE_HEIGHT + DATE_MARGIN;
    let subtitle_top = title_top + title_height + SUBTITLE_OFFSET;
    Header {
        date,
        title: stack(title, title_top, TITLE_SIZE),
        subtitle: stack(subtitle, subtitle_top, SUBTITLE_SIZE),
    }
}

pub fn footer() -> Footer {
    let border_y = HEIGHT as f32 - FOOTER_HEIGHT;
    let logo_y = border_y + BORDER + PADDING;
    let center = logo_y + LOGO_HEIGHT / 2.0;
    Footer {
        border_y,
        logo_y,
        label_x: PADDING + LOGO_WIDTH + LABEL_GAP,
        label_y: center - (ASCENT + DESCENT) * LABEL_SIZE / 2.0 + ASCENT * LABEL_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_per_line() {
        assert_eq!(chars_per_line(TITLE_SIZE), 31);
        assert_eq!(chars_per_line(SUBTITLE_SIZE), 62);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10, 3), Vec::<String>::new());
        assert_eq!(wrap("  one   two  ", 10, 3), ["one two"]);
        assert_eq!(wrap("one two three", 7, 3), ["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4, 3), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap("a abcdefghij", 4, 5), ["a", "abcd", "efgh", "ij"]);
        assert_eq!(wrap("aaa bbb ccc ddd", 3, 2), ["aaa", "bb…"]);
        assert_eq!(wrap("ab cd ef gh", 5, 1), ["ab c…"]);
        assert_eq!(wrap("ünï cödé", 4, 3), ["ünï", "cödé"]);
    }

    #[test]
    fn test_header_centered() {
        let header = header("Tuesday, March 5, 2024", "Hello", "World");
        assert_eq!(header.title.len(), 1);
        assert_eq!(header.subtitle.len(), 1);
        let area_top = PADDING;
        let area_bottom = HEIGHT as f32 - FOOTER_HEIGHT - PADDING;
        assert!(header.date.y > area_top);
        let last = header.subtitle.last().unwrap();
        assert!(last.y < area_bottom);
        // Equal space above the date and below the subtitle box
        let top = header.date.y - baseline(0.0, DATE_LINE_HEIGHT, DATE_SIZE);
        let bottom = last.y - baseline(0.0, SUBTITLE_SIZE * SNUG, SUBTITLE_SIZE) + SUBTITLE_SIZE * SNUG;
        assert!(((top - area_top) - (area_bottom - bottom)).abs() < 0.01);
    }

    #[test]
    fn test_header_fits_long_text() {
        let long = "word ".repeat(100);
        let header = header("Tuesday, March 5, 2024", &long, &long);
        assert_eq!(header.title.len(), MAX_LINES);
        assert_eq!(header.subtitle.len(), 2);
        assert!(header.subtitle.last().unwrap().text.ends_with('…'));
        let last = header.subtitle.last().unwrap();
        let bottom = last.y - baseline(0.0, SUBTITLE_SIZE * SNUG, SUBTITLE_SIZE) + SUBTITLE_SIZE * SNUG;
        assert!(bottom <= PADDING + area() + 0.01);
        assert!(header.date.y - baseline(0.0, DATE_LINE_HEIGHT, DATE_SIZE) >= PADDING);

        // A short title leaves room for the full description
        let header = super::header("", "Short", &long);
        assert_eq!(header.subtitle.len(), MAX_LINES);
    }

    #[test]
    fn test_header_empty() {
        let header = header("", "", "");
        assert!(header.title.is_empty());
        assert!(header.subtitle.is_empty());
        assert_eq!(header.date.text, "");
    }

    #[test]
    fn test_footer() {
        let footer = footer();
        assert_eq!(footer.border_y, 489.0);
        assert_eq!(footer.logo_y, 530.0);
        assert_eq!(footer.label_x, 168.0);
    }
}
