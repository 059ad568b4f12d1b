use std::fs;
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::reports::document::strip_tags;

/// Lines shown on each side of the target line.
pub const CONTEXT_LINES: i64 = 2;

static PRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>").expect("valid regex"));

/// Lines `line - CONTEXT_LINES ..= line + CONTEXT_LINES` of a coverage-annotated source page,
/// markup removed but entities left escaped. Returns the first line number shown along with the
/// text, or `None` if the line is outside the source.
pub fn lines_in_range(annotated_html: &str, line: i64) -> Option<(i64, String)> {
    let source = PRE_RE.captures(annotated_html)?.get(1)?.as_str();
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len() as i64;
    if line < 1 || line > total {
        return None;
    }
    let first = (line - CONTEXT_LINES).max(1);
    let last = (line + CONTEXT_LINES).min(total);
    let text = lines[(first - 1) as usize..last as usize]
        .iter()
        .map(|l| strip_tags(l))
        .collect::<Vec<_>>()
        .join("\n");
    Some((first, text))
}

/// Preformatted snippet around `line` of the annotated source at `path`, or an empty string when
/// the line is negative, the file is missing, or the line is not in it.
pub fn code_snippet(path: &Path, line: i64) -> String {
    if line < 0 {
        return String::new();
    }
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(e) => {
            debug!("No annotated source at {}: {e}", path.display());
            return String::new();
        }
    };
    match lines_in_range(&html, line) {
        Some((first, text)) if !text.is_empty() => format!(
            "<pre class='prettyprint linenums:{first} mt-2'><code class='language-java'>{text}</code></pre>"
        ),
        _ => String::new(),
    }
}
