use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result string a mutation-testing tool reports for a mutant that some test caught.
pub const KILLED: &str = "killed";
/// Result string for a mutant that ran under tests and was not caught.
pub const SURVIVED: &str = "survived";

/// Where and how a mutant was injected, as reported by the mutation-testing tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationDetails {
    /// `className` (slash-separated), `methodName` and `methodDescription`.
    pub method_info: HashMap<String, String>,
    #[serde(default)]
    pub instruction_indices: Vec<i64>,
    #[serde(default)]
    pub mutation_operator_name: String,
    #[serde(default, rename = "mutatorID")]
    pub mutator_id: String,
    #[serde(default)]
    pub file_name: String,
    pub loc: i64,
    #[serde(default)]
    pub mutation_description: String,
    #[serde(default)]
    pub instructions_order: Vec<String>,
    #[serde(default)]
    pub additional_info: HashMap<String, String>,
}

impl MutationDetails {
    /// Dot-separated owning class, e.g. `org.example.Feature`.
    pub fn class_name(&self) -> String {
        self.method_info
            .get("className")
            .map(|c| c.replace('/', "."))
            .unwrap_or_default()
    }

    pub fn method_name(&self) -> &str {
        self.method_info
            .get("methodName")
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn method_description(&self) -> &str {
        self.method_info
            .get("methodDescription")
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Same class, method, line and description. Tool versions may renumber `uniqueID`, so this
    /// is the fallback match.
    pub fn same_site(&self, other: &MutationDetails) -> bool {
        self.class_name() == other.class_name()
            && self.method_name() == other.method_name()
            && self.loc == other.loc
            && self.mutation_description == other.mutation_description
    }
}

/// One mutant from a mutation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    pub mutation_details: MutationDetails,
    /// Outcome at the time the report was written (`survived`, `killed`, `noCoverage`, ...).
    pub result: String,
    #[serde(rename = "uniqueID")]
    pub unique_id: i64,
}

impl MutationRecord {
    pub fn is_killed(&self) -> bool {
        self.result == KILLED
    }

    /// Either the tool's id or the structural site agrees. `result` plays no part.
    pub fn matches(&self, other: &MutationRecord) -> bool {
        self.unique_id == other.unique_id || self.mutation_details.same_site(&other.mutation_details)
    }

    pub fn identity(&self) -> MutationIdentity {
        MutationIdentity {
            class_name: self.mutation_details.class_name(),
            method_name: self.mutation_details.method_name().to_string(),
            line: self.mutation_details.loc,
            description: self.mutation_details.mutation_description.clone(),
            unique_id: self.unique_id,
        }
    }
}

/// The immutable part of a mutant: what challenges compare and hash on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MutationIdentity {
    pub class_name: String,
    pub method_name: String,
    pub line: i64,
    pub description: String,
    pub unique_id: i64,
}

/// Metadata of the class a mutation challenge is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetails {
    pub package_name: String,
    /// Simple class name without package, e.g. `Feature`.
    pub class_name: String,
    /// Workspace root at generation time; paths below are recorded relative to it.
    pub workspace: PathBuf,
    /// Coverage-annotated HTML rendering of the class source.
    pub annotated_source: PathBuf,
}

impl ClassDetails {
    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.class_name)
        }
    }
}
