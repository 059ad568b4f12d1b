use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::SqlStore;
use crate::core::challenges::{ChallengeLifecycle, ChallengeState, EvaluationContext};
use crate::core::cli::VerifyArgs;
use crate::core::diff::SourceDiffOracle;
use crate::core::reports::ReportSnapshot;
use crate::core::store::StoredChallenge;
use crate::types::AppResult;
use crate::types::config::config;

pub const NOT_SOLVABLE: &str = "Not solvable";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifySummary {
    pub solved: usize,
    pub discarded: usize,
    pub open: usize,
    pub skipped: usize,
}

impl VerifySummary {
    /// 2 when the run was interrupted or left challenges unevaluated, else 0.
    pub fn exit_code(&self, still_running: bool) -> i32 {
        if still_running && self.skipped == 0 { 0 } else { 2 }
    }
}

/// Verifies the open pool against the configured workspace and reports.
pub async fn execute_verify(
    args: VerifyArgs,
    store: SqlStore,
    running: Arc<AtomicBool>,
    diff: Arc<dyn SourceDiffOracle>,
) -> AppResult<VerifySummary> {
    let snapshot = ReportSnapshot::load(
        &config().dependency_report_path(),
        &config().mutation_report_path(),
    );
    verify_pool(
        &args,
        &store,
        running,
        diff,
        config().workspace_root(),
        snapshot,
    )
    .await
}

/// Evaluates every open challenge once against `snapshot`, in parallel on the blocking pool.
/// Challenges still queued when `running` drops are counted as skipped and left untouched.
pub async fn verify_pool(
    args: &VerifyArgs,
    store: &SqlStore,
    running: Arc<AtomicBool>,
    diff: Arc<dyn SourceDiffOracle>,
    workspace: PathBuf,
    snapshot: ReportSnapshot,
) -> AppResult<VerifySummary> {
    let pending = store.get_open_challenges().await?;
    if pending.is_empty() {
        info!("No open challenges to verify");
        return Ok(VerifySummary::default());
    }

    // One snapshot per cycle, shared read-only by every evaluation.
    let snapshot = Arc::new(snapshot);
    let workspace = Arc::new(workspace);
    info!(
        "Verifying {} open challenge(s) in {}",
        pending.len(),
        workspace.display()
    );

    let progress = ProgressBar::new(pending.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let handles: Vec<_> = pending
        .into_iter()
        .map(|mut stored| {
            let snapshot = Arc::clone(&snapshot);
            let workspace = Arc::clone(&workspace);
            let diff = Arc::clone(&diff);
            let running = Arc::clone(&running);
            tokio::task::spawn_blocking(move || {
                if !running.load(Ordering::SeqCst) {
                    return (stored, None);
                }
                let ctx = EvaluationContext::new(&workspace, &snapshot, diff.as_ref());
                let state = stored.challenge.evaluate(&ctx);
                (stored, Some(state))
            })
        })
        .collect();

    let mut summary = VerifySummary::default();
    for handle in handles {
        let (stored, state) = handle.await?;
        progress.inc(1);
        let Some(state) = state else {
            summary.skipped += 1;
            continue;
        };
        record_outcome(store, &stored, state, args.dry_run, &mut summary).await?;
    }
    progress.finish_and_clear();

    info!(
        "Verification finished: {} solved, {} discarded, {} still open, {} skipped",
        summary.solved, summary.discarded, summary.open, summary.skipped
    );
    Ok(summary)
}

async fn record_outcome(
    store: &SqlStore,
    stored: &StoredChallenge,
    state: ChallengeState,
    dry_run: bool,
    summary: &mut VerifySummary,
) -> AppResult<()> {
    let challenge = &stored.challenge;
    let reason = match state {
        ChallengeState::Solved => {
            summary.solved += 1;
            info!(
                "Solved ({} points): {challenge}",
                challenge.score()
            );
            None
        }
        ChallengeState::Unsolvable => {
            summary.discarded += 1;
            warn!("Discarding: {challenge}");
            Some(NOT_SOLVABLE)
        }
        ChallengeState::Solvable | ChallengeState::Created => {
            summary.open += 1;
            None
        }
    };
    if !dry_run {
        store
            .update_challenge(stored.id, challenge, state, reason)
            .await?;
    }
    Ok(())
}
