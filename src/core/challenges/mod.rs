pub mod cycle;
pub mod mutation;
pub mod record;

use std::fmt;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use strum::{Display, EnumString};

use crate::core::diff::SourceDiffOracle;
use crate::core::reports::ReportSnapshot;
use crate::types::{Fingerprint, RecordError};

pub use cycle::{CycleChallenge, CyclePair};
pub use mutation::MutationChallenge;
use record::ParsedRecord;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Timestamps every challenge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeRecord {
    pub created: i64,
    /// 0 while open.
    pub solved: i64,
}

impl ChallengeRecord {
    pub fn new() -> Self {
        Self::created_at(now_millis())
    }

    pub fn created_at(created: i64) -> Self {
        Self { created, solved: 0 }
    }

    /// Restores a record read back from storage.
    pub fn restore(created: i64, solved: i64) -> Self {
        Self {
            created,
            solved: solved.max(0),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solved != 0
    }

    /// Stamps the solve time once. Returns false, leaving the record untouched, if it was
    /// already stamped. The stored time is never earlier than `created`.
    pub fn mark_solved(&mut self, at: i64) -> bool {
        if self.is_solved() {
            return false;
        }
        self.solved = at.max(self.created).max(1);
        true
    }
}

impl Default for ChallengeRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a challenge stands after its latest evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
pub enum ChallengeState {
    /// Generated, not evaluated yet.
    Created,
    Solvable,
    Unsolvable,
    Solved,
}

/// What one evaluation cycle can see: the current source tree, the freshly parsed reports and a
/// way to ask what changed since a baseline.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub workspace: &'a Path,
    pub reports: &'a ReportSnapshot,
    pub diff: &'a dyn SourceDiffOracle,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        workspace: &'a Path,
        reports: &'a ReportSnapshot,
        diff: &'a dyn SourceDiffOracle,
    ) -> Self {
        Self {
            workspace,
            reports,
            diff,
        }
    }
}

/// Contract shared by all challenge kinds.
pub trait ChallengeLifecycle {
    fn record(&self) -> &ChallengeRecord;

    fn record_mut(&mut self) -> &mut ChallengeRecord;

    /// Human-facing name of the challenge kind.
    fn name(&self) -> &'static str;

    fn score(&self) -> u32;

    /// Whether the challenge still refers to something that exists in the current sources.
    fn is_solvable(&self, ctx: &EvaluationContext<'_>) -> bool;

    /// Whether the current reports show the challenge as done. Does not touch the record.
    fn check_solved(&self, ctx: &EvaluationContext<'_>) -> bool;

    /// Strings that identify the task; equal challenges yield equal keys.
    fn identity_key(&self) -> Vec<String>;

    /// Self-closing tagged record, with `reason` when the challenge was discarded.
    fn render(&self, reason: Option<&str>) -> String;

    fn created(&self) -> i64 {
        self.record().created
    }

    fn solved(&self) -> i64 {
        self.record().solved
    }

    /// Runs [`check_solved`](Self::check_solved) and stamps the solve time on the first
    /// positive answer. A solved challenge stays solved.
    fn is_solved(&mut self, ctx: &EvaluationContext<'_>) -> bool {
        if self.record().is_solved() {
            return true;
        }
        if !self.check_solved(ctx) {
            return false;
        }
        self.record_mut().mark_solved(now_millis());
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
pub enum ChallengeKind {
    #[strum(serialize = "CycleChallenge")]
    Cycle,
    #[strum(serialize = "MutationChallenge")]
    Mutation,
}

/// Every challenge kind this engine evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Challenge {
    Cycle(CycleChallenge),
    Mutation(MutationChallenge),
}

impl Challenge {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            Challenge::Cycle(_) => ChallengeKind::Cycle,
            Challenge::Mutation(_) => ChallengeKind::Mutation,
        }
    }

    fn inner(&self) -> &dyn ChallengeLifecycle {
        match self {
            Challenge::Cycle(c) => c,
            Challenge::Mutation(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ChallengeLifecycle {
        match self {
            Challenge::Cycle(c) => c,
            Challenge::Mutation(m) => m,
        }
    }

    /// Solved check first, so a challenge that was completed as its sources moved on still
    /// counts; then solvability.
    pub fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> ChallengeState {
        if self.is_solved(ctx) {
            ChallengeState::Solved
        } else if !self.is_solvable(ctx) {
            ChallengeState::Unsolvable
        } else {
            ChallengeState::Solvable
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let kind = self.kind().to_string();
        Fingerprint::of(std::iter::once(kind).chain(self.identity_key()))
    }

    /// Reads a record produced by [`ChallengeLifecycle::render`].
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let parsed = ParsedRecord::parse(text)?;
        let kind: ChallengeKind = parsed
            .tag
            .parse()
            .map_err(|_| RecordError::UnknownTag(parsed.tag.clone()))?;
        match kind {
            ChallengeKind::Cycle => Ok(Challenge::Cycle(CycleChallenge::from_record(&parsed)?)),
            ChallengeKind::Mutation => Ok(Challenge::Mutation(MutationChallenge::from_record(
                &parsed,
            )?)),
        }
    }
}

impl ChallengeLifecycle for Challenge {
    fn record(&self) -> &ChallengeRecord {
        self.inner().record()
    }

    fn record_mut(&mut self) -> &mut ChallengeRecord {
        self.inner_mut().record_mut()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn score(&self) -> u32 {
        self.inner().score()
    }

    fn is_solvable(&self, ctx: &EvaluationContext<'_>) -> bool {
        self.inner().is_solvable(ctx)
    }

    fn check_solved(&self, ctx: &EvaluationContext<'_>) -> bool {
        self.inner().check_solved(ctx)
    }

    fn identity_key(&self) -> Vec<String> {
        self.inner().identity_key()
    }

    fn render(&self, reason: Option<&str>) -> String {
        self.inner().render(reason)
    }
}

impl From<CycleChallenge> for Challenge {
    fn from(challenge: CycleChallenge) -> Self {
        Challenge::Cycle(challenge)
    }
}

impl From<MutationChallenge> for Challenge {
    fn from(challenge: MutationChallenge) -> Self {
        Challenge::Mutation(challenge)
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Challenge::Cycle(c) => fmt::Display::fmt(c, f),
            Challenge::Mutation(m) => fmt::Display::fmt(m, f),
        }
    }
}
