//! Challenges serialize to a single self-closing element:
//!
//! ```text
//! <CycleChallenge created="1700000000000" solved="0" chosenPackage="org.a" cyclePackage="org.b"/>
//! ```
//!
//! `created` and `solved` lead, kind-specific attributes follow in a fixed order, and `reason`
//! closes the element when the challenge was discarded.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::challenges::ChallengeRecord;
use crate::types::RecordError;

static ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*<([A-Za-z][A-Za-z0-9_]*)((?:\s+[A-Za-z][A-Za-z0-9_]*="[^"]*")*)\s*/>\s*$"#)
        .expect("valid regex")
});
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z][A-Za-z0-9_]*)="([^"]*)""#).expect("valid regex"));

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn unescape(value: &str) -> String {
    value
        .replace("&#10;", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Renders `<tag created=".." solved=".." k="v" .. reason=".."/>`.
pub fn render(
    tag: &str,
    record: &ChallengeRecord,
    attributes: &[(&str, String)],
    reason: Option<&str>,
) -> String {
    let mut out = format!(
        "<{tag} created=\"{}\" solved=\"{}\"",
        record.created, record.solved
    );
    for (name, value) in attributes {
        out.push_str(&format!(" {name}=\"{}\"", escape(value)));
    }
    if let Some(reason) = reason.filter(|r| !r.is_empty()) {
        out.push_str(&format!(" reason=\"{}\"", escape(reason)));
    }
    out.push_str("/>");
    out
}

/// A record split into its tag and unescaped attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub tag: String,
    pub attributes: HashMap<String, String>,
}

impl ParsedRecord {
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let caps = ELEMENT_RE
            .captures(text)
            .ok_or_else(|| RecordError::Malformed(text.trim().chars().take(80).collect()))?;
        let attributes = ATTR_RE
            .captures_iter(&caps[2])
            .map(|a| (a[1].to_string(), unescape(&a[2])))
            .collect();
        Ok(Self {
            tag: caps[1].to_string(),
            attributes,
        })
    }

    pub fn get(&self, name: &'static str) -> Result<&str, RecordError> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .ok_or(RecordError::MissingAttribute(name))
    }

    pub fn optional(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn get_i64(&self, name: &'static str) -> Result<i64, RecordError> {
        let value = self.get(name)?;
        value.parse().map_err(|_| RecordError::InvalidAttribute {
            attribute: name,
            value: value.to_string(),
        })
    }

    pub fn challenge_record(&self) -> Result<ChallengeRecord, RecordError> {
        Ok(ChallengeRecord::restore(
            self.get_i64("created")?,
            self.get_i64("solved")?,
        ))
    }

    pub fn reason(&self) -> Option<&str> {
        self.optional("reason")
    }
}
