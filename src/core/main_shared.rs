use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use log::{debug, warn};

use crate::core::cli::{Args, Commands, GenerateArgs};
use crate::core::cmds;
use crate::core::diff::SourceDiffOracle;
use crate::core::logging::init_logging;
use crate::core::store::SqlStore;
use crate::types::AppResult;
use crate::types::config::{CliOverrides, config, init_with_overrides};

pub async fn run_main(diff: Arc<dyn SourceDiffOracle>) -> AppResult<()> {
    let args = Args::parse();

    // Handle global arguments
    if let Some(cwd_arg) = args.cwd.as_ref() {
        let cwd = PathBuf::from(cwd_arg).canonicalize()?;
        let _ = env::set_current_dir(&cwd);
    }
    let cwd = env::current_dir()?;

    // Per-command overrides that belong in the config
    let (branch, seed) = match &args.command {
        Commands::Generate {
            kind: GenerateArgs::Cycle(a),
        } => (None, a.seed),
        Commands::Generate {
            kind: GenerateArgs::Mutation(a),
        } => (a.branch.clone(), a.seed),
        _ => (None, None),
    };

    let cli_overrides = CliOverrides {
        db: args.db.clone(),
        log_level: args.log_level.clone(),
        log_color: args.log_color.clone(),
        workspace: args.workspace.clone(),
        branch,
        seed,
    };

    // Initialize configuration (file, then CLI overrides)
    init_with_overrides(&cli_overrides);

    // Initialize logging after config so level/color are applied
    init_logging();
    debug!("Current working directory: {}", cwd.display());

    if let Commands::Init = args.command {
        return cmds::execute_init().await;
    }

    // Initialize the database
    let db_path = config().db();
    let db_file = PathBuf::from(&db_path);
    if !db_file.exists() {
        debug!(
            "Database file doesn't exist. Creating it at: {}",
            db_file.display()
        );
        let file = std::fs::File::create(&db_file)?;
        drop(file);
    }
    let db_connection_string = format!("sqlite:{db_path}");
    debug!("Using database: {db_connection_string}");
    let store = SqlStore::new(db_connection_string).await?;

    // Setup running flag to handle signals from ctrl-c
    let running = Arc::new(AtomicBool::new(true));
    let running_ctrlc = Arc::clone(&running);

    ctrlc::set_handler(move || {
        warn!("Received Ctrl-C, finishing evaluations in flight..");
        running_ctrlc.store(false, Ordering::SeqCst);
    })
    .expect("Error creating a Ctrl-C handler");

    let exit_code = match args.command {
        Commands::Init => 0,
        Commands::Generate { kind } => {
            cmds::execute_generate(kind, store, diff).await?;
            0
        }
        Commands::Verify(verify_args) => {
            let summary =
                cmds::execute_verify(verify_args, store, Arc::clone(&running), diff).await?;
            summary.exit_code(running.load(Ordering::SeqCst))
        }
        Commands::List(list_args) => {
            cmds::execute_list(list_args, store).await?;
            0
        }
        Commands::Status(status_args) => {
            cmds::execute_status(status_args, store).await?;
            0
        }
        Commands::Purge(purge_args) => {
            cmds::execute_purge(purge_args, store).await?;
            0
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
