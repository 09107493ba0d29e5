#![forbid(unsafe_code)]

//! Text row item: a title wrapped to a fixed column width.

use flexlist::{FlexItem, Placement};
use unicode_width::UnicodeWidthStr;

/// Number of lines `text` occupies when word-wrapped to `width` columns.
///
/// Explicit newlines start a new line; a trailing newline does not add one.
/// Words wider than `width` are broken across lines. Empty text is one line.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut lines = 0;
    for line in text.trim_end_matches('\n').split('\n') {
        let mut count = 1;
        let mut used = 0usize;
        for word in line.split_whitespace() {
            let w = UnicodeWidthStr::width(word);
            let needed = if used == 0 { w } else { used + 1 + w };
            if needed <= width {
                used = needed;
                continue;
            }
            if used > 0 {
                count += 1;
            }
            let extra = w.saturating_sub(1) / width;
            count += extra;
            used = w - extra * width;
        }
        lines += count;
    }
    lines
}

/// A list slot showing one text row.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    wrap_width: usize,
    line_height: f32,
    /// Row shown, if any.
    pub row: Option<usize>,
    /// Title text.
    pub title: String,
    /// Secondary label.
    pub label: String,
    /// Free-form note.
    pub note: String,
    /// Height of the current content.
    pub height: f32,
    /// Last placement.
    pub placement: Option<Placement>,
    /// Visibility.
    pub visible: bool,
}

impl TextRow {
    /// Empty hidden row.
    pub fn new(wrap_width: usize, line_height: f32) -> Self {
        Self {
            wrap_width,
            line_height,
            row: None,
            title: String::new(),
            label: String::new(),
            note: String::new(),
            height: 0.0,
            placement: None,
            visible: false,
        }
    }

    /// Wrapped line count of the current title.
    pub fn lines(&self) -> usize {
        wrapped_line_count(&self.title, self.wrap_width)
    }

    /// Show a row's content at the given height.
    pub fn bind(&mut self, row: usize, title: &str, label: &str, note: &str, height: f32) {
        self.row = Some(row);
        self.title.clear();
        self.title.push_str(title);
        self.label.clear();
        self.label.push_str(label);
        self.note.clear();
        self.note.push_str(note);
        self.height = height;
    }
}

impl FlexItem for TextRow {
    type Content = str;

    fn measure_height(&mut self, content: &str) -> f32 {
        wrapped_line_count(content, self.wrap_width) as f32 * self.line_height
    }

    fn current_height(&self) -> f32 {
        self.height
    }

    fn place(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrapped_line_count("Hello World ", 40), 1);
        assert_eq!(wrapped_line_count("", 40), 1);
    }

    #[test]
    fn words_wrap_at_width() {
        assert_eq!(wrapped_line_count("hello world", 10), 2);
        assert_eq!(wrapped_line_count("hello world", 11), 1);
        assert_eq!(wrapped_line_count("a b c d e f", 3), 3);
    }

    #[test]
    fn newlines_split_and_trailing_newline_is_ignored() {
        assert_eq!(wrapped_line_count("one\ntwo\n", 40), 2);
        assert_eq!(wrapped_line_count("one\n\nthree", 40), 3);
    }

    #[test]
    fn long_words_break() {
        let word = "x".repeat(25);
        assert_eq!(wrapped_line_count(&word, 10), 3);
        assert_eq!(wrapped_line_count(&format!("ab {word}"), 10), 4);
    }

    #[test]
    fn wide_characters_count_double() {
        // Each CJK character occupies two columns.
        assert_eq!(wrapped_line_count("日本語 日本語", 6), 2);
        assert_eq!(wrapped_line_count("日本語 日本語", 13), 1);
    }

    #[test]
    fn measure_scales_with_line_height() {
        let mut row = TextRow::new(10, 18.0);
        assert_eq!(row.measure_height("hello world"), 36.0);
        row.bind(2, "hello", "Row 2", "7", 20.0);
        assert_eq!(row.lines(), 1);
        assert_eq!(row.current_height(), 20.0);
        assert_eq!(row.row, Some(2));
    }
}
