pub mod dependency;
pub mod document;
pub mod mutation;

use std::path::Path;

use crate::types::DependencyGraph;
pub use mutation::MutationReport;

/// The reports of one evaluation cycle, parsed once and shared by every challenge evaluated in
/// that cycle. Either side is `None` when its report was missing or unreadable.
#[derive(Debug, Clone, Default)]
pub struct ReportSnapshot {
    pub cycles: Option<DependencyGraph>,
    pub mutations: Option<MutationReport>,
}

impl ReportSnapshot {
    pub fn load(dependency_report: &Path, mutation_report: &Path) -> Self {
        Self {
            cycles: dependency::load_cycles(dependency_report),
            mutations: mutation::load_mutations(mutation_report),
        }
    }
}
