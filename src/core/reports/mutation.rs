use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::types::{MutationRecord, ReportResult};

/// Fully-qualified class name to the mutants reported for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationReport {
    pub entries: BTreeMap<String, Vec<MutationRecord>>,
}

impl MutationReport {
    pub fn from_slice(bytes: &[u8]) -> ReportResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// Mutants reported under exactly `class_name`.
    pub fn for_class(&self, class_name: &str) -> &[MutationRecord] {
        self.entries
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads and parses the report at `path`; unreadable or malformed reports mean no mutation data
/// this run.
pub fn load_mutations(path: &Path) -> Option<MutationReport> {
    match MutationReport::from_file(path) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Mutation report {} unusable: {e}", path.display());
            None
        }
    }
}
