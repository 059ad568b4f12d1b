pub mod generate;
pub mod init;
pub mod list;
pub mod status;
pub mod verify;

use log::info;

use crate::SqlStore;
use crate::core::cli::PurgeArgs;
use crate::types::AppResult;

pub use generate::execute_generate;
pub use init::execute_init;
pub use list::execute_list;
pub use status::execute_status;
pub use verify::{VerifySummary, execute_verify, verify_pool};

pub async fn execute_purge(args: PurgeArgs, store: SqlStore) -> AppResult<()> {
    let removed = store.purge(args.all).await?;
    info!("Removed {removed} challenge(s) from the pool");
    Ok(())
}
