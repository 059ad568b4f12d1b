use console::style;

use crate::SqlStore;
use crate::core::cli::StatusArgs;
use crate::types::AppResult;

pub async fn execute_status(args: StatusArgs, store: SqlStore) -> AppResult<()> {
    let stats = store.get_pool_stats().await?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => {
            println!("{}", style("Challenge pool").bold());
            println!("  total:     {}", stats.total);
            println!("  open:      {}", style(stats.open).yellow());
            println!("  solved:    {}", style(stats.solved).green());
            println!("  discarded: {}", style(stats.discarded).red());
            println!("  points:    {}", stats.points_earned);
        }
    }
    Ok(())
}
