/// Line that opens and closes a manifest header
pub const HEADER_MARKER: &str = "---";

/// Split `text` into `(payload, body)` if it opens with a complete header.
///
/// The opening marker must be the first line. The payload runs up to the next
/// marker line; the body starts right after that line's newline.
pub(crate) fn split_header(text: &str) -> Option<(&str, &str)> {
    let (first, mut rest) = next_line(text)?;
    if !is_marker(first) {
        return None;
    }

    let payload_start = text.len() - rest.len();
    loop {
        let line_start = text.len() - rest.len();
        let (line, after) = next_line(rest)?;
        if is_marker(line) {
            return Some((&text[payload_start..line_start], after));
        }
        rest = after;
    }
}

fn next_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.find('\n') {
        Some(i) => Some((&s[..i], &s[i + 1..])),
        None => Some((s, "")),
    }
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == HEADER_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        assert_eq!(split_header("---\na: 1\n---\nrest"), Some(("a: 1\n", "rest")));
    }

    #[test]
    fn test_closing_marker_at_eof() {
        assert_eq!(split_header("---\na: 1\n---"), Some(("a: 1\n", "")));
    }

    #[test]
    fn test_lone_marker() {
        assert_eq!(split_header("---"), None);
        assert_eq!(split_header("---\n"), None);
    }

    #[test]
    fn test_longer_rule_is_not_a_marker() {
        assert_eq!(split_header("----\na: 1\n----\n"), None);
    }
}
