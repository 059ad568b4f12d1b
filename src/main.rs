use std::sync::Arc;

use questline::GitDiffOracle;
use questline::run_main;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_main(Arc::new(GitDiffOracle::new())).await?;
    Ok(())
}
