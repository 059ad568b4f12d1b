use std::path::{Path, PathBuf};
use std::sync::Arc;

use fastrand::Rng;
use log::{debug, info, warn};

use crate::SqlStore;
use crate::core::challenges::{Challenge, CycleChallenge, MutationChallenge};
use crate::core::cli::{GenerateArgs, GenerateCycleArgs, GenerateMutationArgs};
use crate::core::diff::SourceDiffOracle;
use crate::core::reports::{dependency, mutation};
use crate::types::config::config;
use crate::types::{AppError, AppResult, ClassDetails};

pub async fn execute_generate(
    args: GenerateArgs,
    store: SqlStore,
    diff: Arc<dyn SourceDiffOracle>,
) -> AppResult<()> {
    let challenge = match args {
        GenerateArgs::Cycle(cycle_args) => generate_cycle(cycle_args)?,
        GenerateArgs::Mutation(mutation_args) => generate_mutation(mutation_args, diff.as_ref())?,
    };

    match store.add_challenge(&challenge).await? {
        Some(id) => info!("Added challenge {id}: {challenge}"),
        None => warn!("An equal challenge is already in the pool: {challenge}"),
    }
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> Rng {
    match seed.or(config().seed()) {
        Some(seed) => {
            debug!("Using seed {seed}");
            Rng::with_seed(seed)
        }
        None => Rng::new(),
    }
}

fn generate_cycle(args: GenerateCycleArgs) -> AppResult<Challenge> {
    let report = config().dependency_report_path();
    let graph = dependency::load_cycles(&report).ok_or_else(|| {
        AppError::Custom(format!(
            "No usable dependency report at {}",
            report.display()
        ))
    })?;
    info!("Dependency report lists {} packages", graph.len());

    let mut rng = seeded_rng(args.seed);
    CycleChallenge::generate(&graph, &mut rng)
        .map(Challenge::from)
        .ok_or_else(|| AppError::Custom("No dependency cycle found in the report".to_string()))
}

/// JaCoCo's HTML report layout: `target/site/jacoco/<package>/<Class>.java.html`.
fn default_annotated_source(package: &str, class: &str) -> PathBuf {
    Path::new("target/site/jacoco")
        .join(package)
        .join(format!("{class}.java.html"))
}

fn generate_mutation(
    args: GenerateMutationArgs,
    diff: &dyn SourceDiffOracle,
) -> AppResult<Challenge> {
    let workspace = config().workspace_root();
    let report_path = config().mutation_report_path();
    let report = mutation::load_mutations(&report_path).ok_or_else(|| {
        AppError::Custom(format!(
            "No usable mutation report at {}",
            report_path.display()
        ))
    })?;

    let (package, class) = match args.class_name.rsplit_once('.') {
        Some((package, class)) => (package.to_string(), class.to_string()),
        None => (String::new(), args.class_name.clone()),
    };
    let annotated_source = args
        .annotated_source
        .map(PathBuf::from)
        .unwrap_or_else(|| default_annotated_source(&package, &class));
    let class_details = ClassDetails {
        package_name: package,
        class_name: class,
        workspace: workspace.clone(),
        annotated_source: workspace.join(annotated_source),
    };

    let commit = args
        .commit
        .or_else(|| diff.current_revision(&workspace))
        .ok_or_else(|| {
            AppError::Custom("Cannot determine the baseline commit; pass --commit".to_string())
        })?;
    let branch = args
        .branch
        .or_else(|| config().workspace().branch().map(str::to_string))
        .or_else(|| diff.current_branch(&workspace));

    let mut rng = seeded_rng(args.seed);
    MutationChallenge::generate(&report, class_details, branch, &workspace, commit, &mut rng)
        .map(Challenge::from)
        .ok_or_else(|| {
            AppError::Custom(format!(
                "No surviving mutants reported for {}",
                args.class_name
            ))
        })
}
