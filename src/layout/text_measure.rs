//! Text Measurement
//!
//! Utilities for measuring text dimensions in terminal cells, used to
//! compute the auto-size hint.
//!
//! Terminal text width depends on Unicode character widths:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width and control characters: 0 cells

use unicode_width::UnicodeWidthStr;

use crate::types::Size;

/// Measure the display width of a single line in terminal cells.
pub fn string_width(s: &str) -> i32 {
    UnicodeWidthStr::width(s) as i32
}

/// Measure unwrapped text: width of the widest line, number of lines.
///
/// Empty text measures `0x0`. A trailing newline does not add a line.
pub fn measure_text(text: &str) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }

    let mut width = 0;
    let mut lines = 0;
    for line in text.lines() {
        width = width.max(string_width(line));
        lines += 1;
    }
    Size::new(width, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width_ascii() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width(""), 0);
    }

    #[test]
    fn test_string_width_wide() {
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width("a日b"), 4);
    }

    #[test]
    fn test_measure_text_lines() {
        assert_eq!(measure_text(""), Size::ZERO);
        assert_eq!(measure_text("hi"), Size::new(2, 1));
        assert_eq!(measure_text("hi\nthere\n"), Size::new(5, 2));
        assert_eq!(measure_text("a\n\nb"), Size::new(1, 3));
    }
}
