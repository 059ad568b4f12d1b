use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use fastrand::Rng;
use log::{debug, info};

use crate::core::challenges::record::{self, ParsedRecord};
use crate::core::challenges::{ChallengeLifecycle, ChallengeRecord, EvaluationContext};
use crate::core::fs_tree::rebase_path;
use crate::core::reports::MutationReport;
use crate::core::snippet::code_snippet;
use crate::types::{
    ClassDetails, MutationDetails, MutationIdentity, MutationRecord, RecordError, SURVIVED,
};

/// Asks for a test that kills one specific surviving mutant.
///
/// The mutant and the code snippet shown with it are fixed at generation; only the solve stamp
/// changes afterwards. The challenge goes stale once the owning class changes after
/// `commit_id`.
#[derive(Debug, Clone)]
pub struct MutationChallenge {
    record: ChallengeRecord,
    mutation: MutationRecord,
    class_details: ClassDetails,
    branch: Option<String>,
    commit_id: String,
    snippet: String,
}

impl MutationChallenge {
    pub const TAG: &'static str = "MutationChallenge";

    /// Binds `mutation` and captures the snippet around its line from the class's annotated
    /// source, looked up under the current `workspace`.
    pub fn new(
        mutation: MutationRecord,
        class_details: ClassDetails,
        branch: Option<String>,
        workspace: &Path,
        commit_id: impl Into<String>,
    ) -> Self {
        let source = rebase_path(
            &class_details.annotated_source,
            &class_details.workspace,
            workspace,
        );
        let snippet = code_snippet(&source, mutation.mutation_details.loc);
        Self {
            record: ChallengeRecord::new(),
            mutation,
            class_details,
            branch,
            commit_id: commit_id.into(),
            snippet,
        }
    }

    /// Binds a uniformly chosen surviving mutant of `class_details`' class, or `None` if the
    /// report has none.
    pub fn generate(
        report: &MutationReport,
        class_details: ClassDetails,
        branch: Option<String>,
        workspace: &Path,
        commit_id: impl Into<String>,
        rng: &mut Rng,
    ) -> Option<Self> {
        let class_name = class_details.qualified_name();
        let candidates: Vec<&MutationRecord> = report
            .for_class(&class_name)
            .iter()
            .filter(|m| m.result == SURVIVED)
            .collect();
        if candidates.is_empty() {
            debug!("No surviving mutants reported for {class_name}");
            return None;
        }
        let mutation = candidates[rng.usize(..candidates.len())].clone();
        info!(
            "Generated mutation challenge for {class_name}:{} ({})",
            mutation.mutation_details.loc, mutation.mutation_details.mutation_description
        );
        Some(Self::new(
            mutation,
            class_details,
            branch,
            workspace,
            commit_id,
        ))
    }

    pub fn mutation(&self) -> &MutationRecord {
        &self.mutation
    }

    pub fn identity(&self) -> MutationIdentity {
        self.mutation.identity()
    }

    pub fn class_details(&self) -> &ClassDetails {
        &self.class_details
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    pub fn unique_id(&self) -> i64 {
        self.mutation.unique_id
    }

    pub fn line_of_code(&self) -> i64 {
        self.mutation.mutation_details.loc
    }

    pub fn mutation_description(&self) -> &str {
        &self.mutation.mutation_details.mutation_description
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// The mutated file, or an empty string when no snippet could be captured.
    pub fn file_name(&self) -> &str {
        if self.snippet.is_empty() {
            ""
        } else {
            &self.mutation.mutation_details.file_name
        }
    }

    pub fn from_record(parsed: &ParsedRecord) -> Result<Self, RecordError> {
        let class = parsed.get("class")?;
        let method_info = HashMap::from([
            ("className".to_string(), class.replace('.', "/")),
            ("methodName".to_string(), parsed.get("method")?.to_string()),
            (
                "methodDescription".to_string(),
                parsed.optional("methodDescription").unwrap_or_default().to_string(),
            ),
        ]);
        let mutation = MutationRecord {
            mutation_details: MutationDetails {
                method_info,
                instruction_indices: vec![],
                mutation_operator_name: parsed.optional("operator").unwrap_or_default().to_string(),
                mutator_id: parsed.optional("mutator").unwrap_or_default().to_string(),
                file_name: parsed.optional("fileName").unwrap_or_default().to_string(),
                loc: parsed.get_i64("lineOfCode")?,
                mutation_description: parsed.get("mutationDescription")?.to_string(),
                instructions_order: vec![],
                additional_info: HashMap::new(),
            },
            result: parsed.optional("result").unwrap_or_default().to_string(),
            unique_id: parsed.get_i64("uniqueID")?,
        };
        let class_details = ClassDetails {
            package_name: parsed.get("package")?.to_string(),
            class_name: parsed.get("simpleClass")?.to_string(),
            workspace: PathBuf::from(parsed.optional("workspace").unwrap_or_default()),
            annotated_source: PathBuf::from(
                parsed.optional("annotatedSource").unwrap_or_default(),
            ),
        };
        Ok(Self {
            record: parsed.challenge_record()?,
            mutation,
            class_details,
            branch: parsed.optional("branch").map(str::to_string),
            commit_id: parsed.get("commit")?.to_string(),
            snippet: parsed.optional("snippet").unwrap_or_default().to_string(),
        })
    }
}

impl ChallengeLifecycle for MutationChallenge {
    fn record(&self) -> &ChallengeRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ChallengeRecord {
        &mut self.record
    }

    fn name(&self) -> &'static str {
        "Mutation Test"
    }

    fn score(&self) -> u32 {
        4
    }

    /// Stale once the owning class shows up among the files changed since the baseline commit.
    /// No diff information means solvable.
    fn is_solvable(&self, ctx: &EvaluationContext<'_>) -> bool {
        let package = &self.class_details.package_name;
        let Some(changed) = ctx.diff.changed_files(ctx.workspace, &self.commit_id, package)
        else {
            return true;
        };
        let class_name = self.class_details.qualified_name();
        !changed.iter().any(|c| c.replace('/', ".") == class_name)
    }

    /// The current report lists the bound mutant, by id or by site, as killed.
    fn check_solved(&self, ctx: &EvaluationContext<'_>) -> bool {
        let Some(report) = ctx.reports.mutations.as_ref() else {
            return false;
        };
        report
            .for_class(&self.mutation.mutation_details.class_name())
            .iter()
            .any(|m| m.matches(&self.mutation) && m.is_killed())
    }

    fn identity_key(&self) -> Vec<String> {
        let id = self.identity();
        vec![
            id.class_name,
            id.method_name,
            id.line.to_string(),
            id.description,
            id.unique_id.to_string(),
        ]
    }

    fn render(&self, reason: Option<&str>) -> String {
        let details = &self.mutation.mutation_details;
        let mut attributes = vec![
            ("class", details.class_name()),
            ("method", details.method_name().to_string()),
            ("methodDescription", details.method_description().to_string()),
            ("lineOfCode", details.loc.to_string()),
            ("mutationDescription", details.mutation_description.clone()),
            ("operator", details.mutation_operator_name.clone()),
            ("mutator", details.mutator_id.clone()),
            ("fileName", details.file_name.clone()),
            ("uniqueID", self.mutation.unique_id.to_string()),
            ("result", self.mutation.result.clone()),
            ("package", self.class_details.package_name.clone()),
            ("simpleClass", self.class_details.class_name.clone()),
            (
                "workspace",
                self.class_details.workspace.to_string_lossy().into_owned(),
            ),
            (
                "annotatedSource",
                self.class_details
                    .annotated_source
                    .to_string_lossy()
                    .into_owned(),
            ),
        ];
        if let Some(branch) = &self.branch {
            attributes.push(("branch", branch.clone()));
        }
        attributes.push(("commit", self.commit_id.clone()));
        attributes.push(("snippet", self.snippet.clone()));
        record::render(Self::TAG, &self.record, &attributes, reason)
    }
}

impl PartialEq for MutationChallenge {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for MutationChallenge {}

impl Hash for MutationChallenge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for MutationChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Write a test to kill the mutant \"{}\" at line {} of method {} in class {} in package {} (created for branch {})",
            self.mutation_description(),
            self.line_of_code(),
            self.mutation.mutation_details.method_name(),
            self.class_details.class_name,
            self.class_details.package_name,
            self.branch.as_deref().unwrap_or("unknown")
        )
    }
}
