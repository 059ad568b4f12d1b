pub mod core;

// Re-export key items for easy importing in this crate
pub use self::core::store::SqlStore;
pub use self::core::types;

// Re-export key items for easy importing in other crates
pub use self::core::challenges::{
    Challenge, ChallengeKind, ChallengeLifecycle, ChallengeRecord, ChallengeState, CycleChallenge,
    CyclePair, EvaluationContext, MutationChallenge,
};
pub use self::core::diff::{GitDiffOracle, SourceDiffOracle};
pub use self::core::main_shared::run_main;
pub use self::core::reports::{MutationReport, ReportSnapshot};
