//! Plain-text helpers shared by the HTML extraction and the classifier.

/// Collapse every run of whitespace into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed, lowercased form used for phrase matching
pub fn normalize_for_match(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Number of characters (not bytes) in the text
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte range covering `radius` characters on either side of `start..end`.
///
/// Both ends are clamped to the text and always fall on character
/// boundaries, so the range can be used to slice `text` directly.
pub fn char_window(text: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let window_start = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .take(radius)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(start)
    };
    let window_end = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    (window_start, window_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Full\n\tCourse,   No  Certificate "), "Full Course, No Certificate");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(normalize_for_match("Enroll  for\nFREE"), "enroll for free");
    }

    #[test]
    fn test_char_window_ascii() {
        let text = "0123456789$49abcdefghij";
        let (s, e) = char_window(text, 10, 13, 3);
        assert_eq!(&text[s..e], "789$49abc");
    }

    #[test]
    fn test_char_window_clamps_and_respects_boundaries() {
        let text = "ééé$5ééé";
        let start = text.find('$').unwrap();
        let (s, e) = char_window(text, start, start + 2, 50);
        assert_eq!((s, e), (0, text.len()));

        let (s, e) = char_window(text, start, start + 2, 1);
        assert_eq!(&text[s..e], "é$5é");
    }
}
