// src/core/sanitize.rs

/// Collapse every whitespace run (newlines, tabs, NBSP, full-width space)
/// into one ASCII space and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Join lines with a single space. Blank lines disappear; spacing inside
/// a line is kept.
pub fn join_lines(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`, not blank.
pub fn sanitize_sheet_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let out: String = cleaned.chars().take(31).collect();
    if out.trim().is_empty() { fallback.chars().take(31).collect() } else { out }
}

/// File-name-safe stem; path separators and reserved characters become `_`.
pub fn sanitize_file_stem(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.trim().chars() {
        let bad = ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
        if bad || ch.is_whitespace() {
            if !last_us { out.push('_'); last_us = true; }
        } else { out.push(ch); last_us = false; }
    }
    let out = out.trim_matches(|c| c == '_' || c == '.').to_string();
    if out.is_empty() { s!(fallback) } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(normalize_ws("  北京\n\t 上海\u{3000}广州 "), "北京 上海 广州");
    }

    #[test]
    fn lines_join_with_single_space() {
        assert_eq!(join_lines("字节跳动\n  (北京)\n\n有限公司"), "字节跳动 (北京) 有限公司");
    }

    #[test]
    fn sheet_names_are_excel_safe() {
        assert_eq!(sanitize_sheet_name("2025/秋招:汇总", "Sheet"), "2025_秋招_汇总");
        assert_eq!(sanitize_sheet_name("   ", "Sheet1"), "Sheet1");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "S").chars().count(), 31);
    }

    #[test]
    fn file_stems_drop_separators() {
        assert_eq!(sanitize_file_stem("秋招 汇总/2025", "doc"), "秋招_汇总_2025");
        assert_eq!(sanitize_file_stem("..", "doc"), "doc");
    }
}
