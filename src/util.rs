//! Shared text helpers for the plain-text views

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string so it occupies at most `max_cols` terminal columns.
///
/// Truncated output ends with `…`, which counts toward the limit. Wide
/// characters (CJK, emoji) are never split.
///
/// # Examples
///
/// ```
/// use unitrack::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Harvard University", 8), "Harvard…");
/// assert_eq!(truncate_to_width("MIT", 8), "MIT");
/// ```
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    let budget = max_cols - 1; // room for the ellipsis
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Truncate then right-pad with spaces to exactly `cols` columns.
pub fn pad_to_width(s: &str, cols: usize) -> String {
    let mut out = truncate_to_width(s, cols);
    let w = out.width();
    if w < cols {
        out.push_str(&" ".repeat(cols - w));
    }
    out
}

/// Group the integer part of a number with commas: 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
