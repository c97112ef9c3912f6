use crate::ast::Cursor;

const LINE_PREFIXES: [&str; 5] = ["///", "//!<", "//!>", "//!", "//"];

/// Documentation attached to a declaration: brief comment first, then the
/// cleaned raw comment.
pub fn description_of<C: Cursor>(cursor: &C) -> Option<String> {
    if let Some(brief) = cursor.brief_comment() {
        let brief = brief.trim();
        if !brief.is_empty() {
            return Some(brief.to_string());
        }
    }
    cursor.raw_comment().and_then(clean_comment)
}

/// Strip comment fences and per-line markers, joining the remaining lines
/// with single spaces. Returns `None` when nothing but markup is left.
pub fn clean_comment(raw: &str) -> Option<String> {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("/*") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("*/") {
        body = rest;
    }

    let mut parts: Vec<&str> = Vec::new();
    for line in body.lines() {
        let mut line = line.trim();
        if let Some(rest) = line.strip_prefix('*') {
            line = rest.trim_start();
        }
        if let Some(rest) = LINE_PREFIXES
            .iter()
            .find_map(|prefix| line.strip_prefix(prefix))
        {
            line = rest.trim_start();
        }
        if !line.is_empty() {
            parts.push(line);
        }
    }

    let cleaned = parts.join(" ");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
