#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use questline::SourceDiffOracle;
use questline::types::{MutationDetails, MutationRecord};

/// Renders a JDepend-style HTML report whose cycles table holds `rows`.
pub fn jdepend_html(rows: &[(&str, &[&str])]) -> String {
    let mut html = String::from(
        "<html><body>\n<h2><a name=\"summary\"></a>Summary</h2>\n\
         <table><tr><th>Package</th><th>Total Classes</th></tr>\
         <tr><td>ignored</td><td>3</td></tr></table>\n\
         <h2><a name=\"cycles\"></a>Cycles</h2>\n\
         <table width=\"100%\">\n<tr>\n<th>Package</th>\n<th>Package Dependencies</th>\n</tr>\n",
    );
    for (package, deps) in rows {
        let links: Vec<String> = deps
            .iter()
            .map(|d| format!("<a href=\"#{d}\">{d}</a>"))
            .collect();
        html.push_str(&format!(
            "<tr>\n<td><a href=\"#PK{package}\">{package}</a></td>\n<td>{}</td>\n</tr>\n",
            links.join(" ")
        ));
    }
    html.push_str("</table>\n</body></html>\n");
    html
}

/// Creates a directory per package (`org.a` -> `src/org/a`) under `root`.
pub fn create_package_dirs(root: &Path, packages: &[&str]) {
    for package in packages {
        fs::create_dir_all(root.join("src").join(package.replace('.', "/"))).unwrap();
    }
}

pub fn mutation(class: &str, method: &str, loc: i64, description: &str, id: i64, result: &str) -> MutationRecord {
    MutationRecord {
        mutation_details: MutationDetails {
            method_info: HashMap::from([
                ("className".to_string(), class.replace('.', "/")),
                ("methodName".to_string(), method.to_string()),
                (
                    "methodDescription".to_string(),
                    "(Ljava/lang/Integer;)Ljava/lang/Integer;".to_string(),
                ),
            ]),
            instruction_indices: vec![30],
            mutation_operator_name: "ROR".to_string(),
            mutator_id: "IF_ICMPGT-IF_ICMPLT-50".to_string(),
            file_name: "Feature.java".to_string(),
            loc,
            mutation_description: description.to_string(),
            instructions_order: vec!["30".to_string()],
            additional_info: HashMap::new(),
        },
        result: result.to_string(),
        unique_id: id,
    }
}

/// Diff oracle with a canned answer that records the calls it receives.
pub struct FakeDiff {
    pub changed: Option<Vec<String>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeDiff {
    pub fn unchanged() -> Self {
        Self::with(Some(vec![]))
    }

    pub fn unknown() -> Self {
        Self::with(None)
    }

    pub fn with(changed: Option<Vec<String>>) -> Self {
        Self {
            changed,
            calls: Mutex::new(vec![]),
        }
    }
}

impl SourceDiffOracle for FakeDiff {
    fn changed_files(&self, _workspace: &Path, baseline: &str, package: &str) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .push((baseline.to_string(), package.to_string()));
        self.changed.clone()
    }

    fn current_revision(&self, _workspace: &Path) -> Option<String> {
        Some("abc123".to_string())
    }

    fn current_branch(&self, _workspace: &Path) -> Option<String> {
        Some("main".to_string())
    }
}
