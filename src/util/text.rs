use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// CJK characters and most emoji occupy 2 columns; combining marks occupy
/// none. Plain `len()` is wrong for all of these.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate a string to fit `max_width` terminal columns, appending "..."
/// when text was cut off.
///
/// Returns `Cow::Borrowed` when the string already fits. For widths of 3 or
/// fewer columns there is no room for a character plus the ellipsis, so as
/// many characters as fit are returned without one.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > budget {
            break;
        }
        width += char_width;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("Hello"), 5);
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn test_fits_without_truncation() {
        assert_eq!(truncate_to_width("Short", 10), "Short");
        assert!(matches!(truncate_to_width("Short", 5), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test!", 0), "");
        assert_eq!(truncate_to_width("Test!", 1), "T");
        assert_eq!(truncate_to_width("Test!", 3), "Tes");
    }

    #[test]
    fn test_wide_chars_respect_budget() {
        // Each CJK char is 2 columns; 7 columns leaves 4 for text + "..."
        let result = truncate_to_width("你好世界", 7);
        assert_eq!(result, "你好...");
        assert!(display_width(&result) <= 7);
    }

    #[test]
    fn test_result_never_exceeds_width() {
        for width in 0..12 {
            let result = truncate_to_width("A longer story title", width);
            assert!(
                display_width(&result) <= width,
                "width {} produced {:?}",
                width,
                result
            );
        }
    }
}
