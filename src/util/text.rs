use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count as 2).
///
/// ```
/// use newsman::util::display_width;
///
/// assert_eq!(display_width("News"), 4);
/// assert_eq!(display_width("新闻"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates `s` to at most `max_width` columns, ending in "..." when cut.
///
/// Widths of 3 or less have no room for an ellipsis, so the result is just
/// the characters that fit. Returns borrowed input when nothing is cut.
///
/// ```
/// use newsman::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Markets rally", 20), "Markets rally");
/// assert_eq!(truncate_to_width("Markets rally", 10), "Markets...");
/// assert_eq!(truncate_to_width("Markets", 2), "Ma");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cut = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..cut], suffix))
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Headlines and summaries come from scraped sources and are printed
/// straight into the terminal. Removes C0 controls (except tab, newline,
/// carriage return), DEL, CSI sequences (`ESC [ ... final`), OSC sequences
/// (`ESC ] ... BEL|ST`), and stray ESC bytes.
///
/// ```
/// use newsman::util::strip_control_chars;
///
/// assert_eq!(strip_control_chars("\x1b[31mBreaking\x1b[0m"), "Breaking");
/// ```
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_control = |c: char| c == '\x1b' || c == '\x7f' || (c < ' ' && !matches!(c, '\t' | '\n' | '\r'));

    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_control(c) {
                out.push(c);
            }
            continue;
        }

        match chars.peek() {
            Some('[') => {
                chars.next();
                // Parameters and intermediates run until a final byte in @..~
                for next in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&next) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '\x07' {
                        break;
                    }
                    if next == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Cow::Owned(out)
}

/// Uppercase the first character, for category labels (`"tech"` → `"Tech"`).
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_cjk_truncation() {
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好世界", 5), "你...");
        assert_eq!(truncate_to_width("你好", 1), "");
        assert_eq!(truncate_to_width("你好世界", 3), "你");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Testing", 3), "Tes");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
    }

    #[test]
    fn test_borrowed_when_fits() {
        assert!(matches!(truncate_to_width("fits", 10), Cow::Borrowed(_)));
        assert!(matches!(strip_control_chars("clean text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_csi_and_osc() {
        assert_eq!(strip_control_chars("a\x1b[1;32mb\x1b[0mc"), "abc");
        assert_eq!(
            strip_control_chars("x\x1b]0;evil title\x07y"),
            "xy"
        );
        assert_eq!(strip_control_chars("x\x1b]8;;http://e\x1b\\y"), "xy");
    }

    #[test]
    fn test_strip_keeps_whitespace_controls() {
        assert_eq!(strip_control_chars("a\tb\nc\rd\x00e\x7f"), "a\tb\nc\rde");
        assert_eq!(strip_control_chars("bare\x1besc"), "bareesc");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("tech"), "Tech");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
    }
}
