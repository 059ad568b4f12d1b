use std::fmt;
use std::hash::{Hash, Hasher};

use fastrand::Rng;
use log::{debug, info};

use crate::core::challenges::record::{self, ParsedRecord};
use crate::core::challenges::{ChallengeLifecycle, ChallengeRecord, EvaluationContext};
use crate::core::fs_tree::package_exists;
use crate::types::{DependencyGraph, RecordError};

/// Two distinct packages that depend on each other. Equality ignores order.
#[derive(Debug, Clone, Eq)]
pub struct CyclePair {
    chosen: String,
    cycle: String,
}

impl CyclePair {
    /// `None` if both names are the same package.
    pub fn new(chosen: impl Into<String>, cycle: impl Into<String>) -> Option<Self> {
        let (chosen, cycle) = (chosen.into(), cycle.into());
        (chosen != cycle).then_some(Self { chosen, cycle })
    }

    pub fn chosen(&self) -> &str {
        &self.chosen
    }

    pub fn cycle(&self) -> &str {
        &self.cycle
    }

    fn ordered(&self) -> (&str, &str) {
        if self.chosen <= self.cycle {
            (&self.chosen, &self.cycle)
        } else {
            (&self.cycle, &self.chosen)
        }
    }

    /// Looks for a package that is listed by, and lists, a randomly chosen package.
    ///
    /// Packages are tried in a shuffled order, each at most once, and each one's dependencies
    /// are scanned in a shuffled order. A dependency only qualifies if the graph has an entry for
    /// it. Returns `None` once every package was tried without success.
    pub fn find(graph: &DependencyGraph, rng: &mut Rng) -> Option<Self> {
        let mut packages: Vec<&str> = graph.packages().collect();
        rng.shuffle(&mut packages);

        for chosen in packages {
            let mut dependencies: Vec<&str> = graph
                .dependencies(chosen)
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect();
            rng.shuffle(&mut dependencies);

            let found = dependencies
                .into_iter()
                .find(|dep| *dep != chosen && graph.depends_on(dep, chosen));
            if let Some(cycle) = found {
                return Self::new(chosen, cycle);
            }
            debug!("No cycle through {chosen}");
        }
        None
    }
}

impl PartialEq for CyclePair {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Hash for CyclePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

/// Asks for the mutual dependency between two packages to be broken.
#[derive(Debug, Clone)]
pub struct CycleChallenge {
    record: ChallengeRecord,
    pair: CyclePair,
}

impl CycleChallenge {
    pub const TAG: &'static str = "CycleChallenge";

    pub fn new(pair: CyclePair) -> Self {
        Self::with_record(ChallengeRecord::new(), pair)
    }

    pub fn with_record(record: ChallengeRecord, pair: CyclePair) -> Self {
        Self { record, pair }
    }

    /// Picks a cycle from a freshly parsed report, or `None` if the report has none.
    pub fn generate(graph: &DependencyGraph, rng: &mut Rng) -> Option<Self> {
        let pair = CyclePair::find(graph, rng)?;
        info!(
            "Generated cycle challenge {} <-> {}",
            pair.chosen(),
            pair.cycle()
        );
        Some(Self::new(pair))
    }

    pub fn pair(&self) -> &CyclePair {
        &self.pair
    }

    pub fn chosen_package(&self) -> &str {
        self.pair.chosen()
    }

    pub fn cycle_package(&self) -> &str {
        self.pair.cycle()
    }

    fn packages_exist(&self, ctx: &EvaluationContext<'_>) -> bool {
        package_exists(ctx.workspace, self.chosen_package())
            && package_exists(ctx.workspace, self.cycle_package())
    }

    pub fn from_record(parsed: &ParsedRecord) -> Result<Self, RecordError> {
        let chosen = parsed.get("chosenPackage")?;
        let cycle = parsed.get("cyclePackage")?;
        let pair = CyclePair::new(chosen, cycle).ok_or(RecordError::InvalidAttribute {
            attribute: "cyclePackage",
            value: cycle.to_string(),
        })?;
        Ok(Self::with_record(parsed.challenge_record()?, pair))
    }
}

impl ChallengeLifecycle for CycleChallenge {
    fn record(&self) -> &ChallengeRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ChallengeRecord {
        &mut self.record
    }

    fn name(&self) -> &'static str {
        "Dependencies Cycle"
    }

    fn score(&self) -> u32 {
        5
    }

    /// Both packages still have a directory somewhere in the workspace.
    fn is_solvable(&self, ctx: &EvaluationContext<'_>) -> bool {
        self.packages_exist(ctx)
    }

    /// Open only while the fresh report still shows both packages listing each other. A missing
    /// or unreadable report, or one that lost either package, counts as resolved. A vanished
    /// package directory is a solvability question, not a solve.
    fn check_solved(&self, ctx: &EvaluationContext<'_>) -> bool {
        if !self.packages_exist(ctx) {
            return false;
        }
        let Some(graph) = ctx.reports.cycles.as_ref() else {
            return true;
        };
        let (chosen, cycle) = (self.chosen_package(), self.cycle_package());
        if !graph.contains(chosen) || !graph.contains(cycle) {
            return true;
        }
        !graph.has_mutual_cycle(chosen, cycle)
    }

    fn identity_key(&self) -> Vec<String> {
        let (a, b) = self.pair.ordered();
        vec![a.to_string(), b.to_string()]
    }

    fn render(&self, reason: Option<&str>) -> String {
        record::render(
            Self::TAG,
            &self.record,
            &[
                ("chosenPackage", self.chosen_package().to_string()),
                ("cyclePackage", self.cycle_package().to_string()),
            ],
            reason,
        )
    }
}

impl PartialEq for CycleChallenge {
    fn eq(&self, other: &Self) -> bool {
        self.pair == other.pair
    }
}

impl Eq for CycleChallenge {}

impl Hash for CycleChallenge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pair.hash(state);
    }
}

impl fmt::Display for CycleChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solve the cycle between packages {} and {}",
            self.chosen_package(),
            self.cycle_package()
        )
    }
}
