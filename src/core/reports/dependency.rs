use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::core::reports::document::Document;
use crate::types::{DependencyGraph, ReportError, ReportResult};

/// Anchor name of the cycles section in a JDepend HTML report.
pub const CYCLES_ANCHOR: &str = "cycles";
/// Expected label of the first header column of the cycles table.
pub const PACKAGE_HEADER: &str = "Package";

/// Extracts the package dependency lists from the cycles table of a dependency report.
///
/// Each data row contributes its first column as the package and the whitespace-separated names
/// in the second column, up to the first line break, as its dependencies.
pub fn parse_cycles(document: &Document) -> ReportResult<DependencyGraph> {
    let table = document.table_after_anchor(CYCLES_ANCHOR).ok_or_else(|| {
        ReportError::FormatMismatch(format!("no table after anchor '{CYCLES_ANCHOR}'"))
    })?;

    let header = table
        .header()
        .and_then(|row| row.first_header())
        .map(|cell| cell.text())
        .unwrap_or_default();
    if header != PACKAGE_HEADER {
        return Err(ReportError::FormatMismatch(format!(
            "expected first header '{PACKAGE_HEADER}', found '{header}'"
        )));
    }

    let mut graph = DependencyGraph::new();
    for row in table.data_rows() {
        let mut cells = row.data();
        let (Some(package), Some(deps)) = (cells.next(), cells.next()) else {
            debug!("Skipping cycles row with fewer than two columns");
            continue;
        };
        let package = package.text();
        if package.is_empty() {
            continue;
        }
        let dependencies: Vec<String> = deps
            .first_line_text()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        debug!("{package} -> {dependencies:?}");
        graph.insert(package, dependencies);
    }
    Ok(graph)
}

pub fn parse_cycles_file(path: &Path) -> ReportResult<DependencyGraph> {
    let html = fs::read_to_string(path)?;
    parse_cycles(&Document::parse(html))
}

/// Reads and parses the report at `path`. A missing file or an unexpected layout means no cycle
/// data is available this run.
pub fn load_cycles(path: &Path) -> Option<DependencyGraph> {
    match parse_cycles_file(path) {
        Ok(graph) => Some(graph),
        Err(e) => {
            warn!("Dependency report {} unusable: {e}", path.display());
            None
        }
    }
}
