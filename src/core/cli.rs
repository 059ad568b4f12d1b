use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "questline", version, about, long_about = None)]
pub struct Args {
    /// All relative paths will be interpreted relative to this directory.
    #[arg(long, global = true)]
    pub cwd: Option<String>,

    /// Location of the sqlite database holding the challenge pool
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Root of the source tree the reports describe
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// Logging level (overrides config). One of: trace, debug, info, warn, error
    #[arg(long = "log.level", global = true)]
    pub log_level: Option<String>,

    /// Logging color control: "on" to force colors, "off" to disable; omit for auto
    #[arg(long = "log.color", global = true)]
    pub log_color: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example questline.toml into the current directory
    Init,

    /// Generate a new challenge from the current reports
    Generate {
        #[command(subcommand)]
        kind: GenerateArgs,
    },

    /// Re-evaluate every open challenge against the current reports
    Verify(VerifyArgs),

    /// List challenges in the pool
    List(ListArgs),

    /// Show totals for the challenge pool
    Status(StatusArgs),

    /// Remove closed challenges from the pool
    Purge(PurgeArgs),
}

#[derive(Subcommand, Debug)]
pub enum GenerateArgs {
    /// Pick a mutual dependency between two packages from the dependency report
    Cycle(GenerateCycleArgs),

    /// Bind a surviving mutant of one class from the mutation report
    Mutation(GenerateMutationArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateCycleArgs {
    /// Seed for the random choice of packages.
    /// Replaces config [generate].seed if provided.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct GenerateMutationArgs {
    /// Fully-qualified class name, e.g. org.example.Feature
    #[arg(long = "class")]
    pub class_name: String,

    /// Coverage-annotated HTML page of the class source, relative to the workspace
    #[arg(long)]
    pub annotated_source: Option<String>,

    /// Branch the challenge is created for.
    /// Replaces config [workspace].branch if provided; defaults to the checked-out branch.
    #[arg(long)]
    pub branch: Option<String>,

    /// Baseline commit; defaults to the checked-out revision
    #[arg(long)]
    pub commit: Option<String>,

    /// Seed for the random choice of mutant.
    /// Replaces config [generate].seed if provided.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Only report what would change, without writing to the pool
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include solved and discarded challenges
    #[arg(long)]
    pub all: bool,

    /// Output format: "table" (default), "json", or "records"
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format: "table" (default) or "json"
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Also remove discarded (unsolvable) challenges
    #[arg(long)]
    pub all: bool,
}
