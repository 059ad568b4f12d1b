//! Just enough of an HTML reader for analysis reports: named anchors, the table that follows
//! them, and the text of each cell.

use once_cell::sync::Lazy;
use regex::Regex;

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").expect("valid regex"));
static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid regex"));
static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</(?:th|td)\s*>").expect("valid regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*<br\s*/?>\s*").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct Document {
    html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub header: bool,
    pub html: String,
}

impl Document {
    pub fn parse(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// The first table that starts after `<a name="{name}">`.
    pub fn table_after_anchor(&self, name: &str) -> Option<Table> {
        let anchor = Regex::new(&format!(
            r#"(?is)<a\b[^>]*\bname\s*=\s*["']?{}["']?[\s/>]"#,
            regex::escape(name)
        ))
        .ok()?;
        let start = anchor.find(&self.html)?.end();
        let body = TABLE_RE.captures(&self.html[start..])?.get(1)?.as_str();
        Some(Table::parse(body))
    }
}

impl Table {
    fn parse(body: &str) -> Self {
        let rows = ROW_RE
            .captures_iter(body)
            .map(|row| Row {
                cells: CELL_RE
                    .captures_iter(&row[1])
                    .map(|cell| Cell {
                        header: cell[1].eq_ignore_ascii_case("th"),
                        html: cell[2].to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or_default()
    }
}

impl Row {
    pub fn first_header(&self) -> Option<&Cell> {
        self.cells.iter().find(|c| c.header)
    }

    pub fn data(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.header)
    }
}

impl Cell {
    /// Visible text with tags removed, entities decoded and whitespace collapsed.
    pub fn text(&self) -> String {
        text_of(&self.html)
    }

    /// Text of the part of the cell before the first line break.
    pub fn first_line_text(&self) -> String {
        let first = BREAK_RE.split(&self.html).next().unwrap_or_default();
        text_of(first)
    }
}

pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn text_of(html: &str) -> String {
    decode_entities(&strip_tags(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_collapses_markup() {
        let cell = Cell {
            header: false,
            html: "<a href=\"#x\">org.a</a>\n   <a href=\"#y\">org.b</a>&nbsp;".to_string(),
        };
        assert_eq!(cell.text(), "org.a org.b");
    }

    #[test]
    fn first_line_stops_at_break() {
        let cell = Cell {
            header: false,
            html: "org.a org.b<br/>org.c<BR>org.d".to_string(),
        };
        assert_eq!(cell.first_line_text(), "org.a org.b");
    }

    #[test]
    fn table_lookup_requires_anchor() {
        let doc = Document::parse("<table><tr><th>Package</th></tr></table>");
        assert!(doc.table_after_anchor("cycles").is_none());
    }

    #[test]
    fn table_lookup_skips_tables_before_anchor() {
        let doc = Document::parse(
            "<table><tr><th>Summary</th></tr></table>\
             <h2><a name=\"cycles\"></a>Cycles</h2>\
             <table><tr><th>Package</th><th>Deps</th></tr><tr><td>a</td><td>b</td></tr></table>",
        );
        let table = doc.table_after_anchor("cycles").expect("table");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.header().and_then(Row::first_header).map(Cell::text),
            Some("Package".to_string())
        );
        assert_eq!(table.data_rows()[0].data().count(), 2);
    }
}
