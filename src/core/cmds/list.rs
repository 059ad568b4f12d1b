use chrono::{DateTime, Utc};
use console::style;
use log::info;
use serde::Serialize;

use crate::SqlStore;
use crate::core::challenges::{ChallengeKind, ChallengeLifecycle, ChallengeState};
use crate::core::cli::ListArgs;
use crate::core::store::StoredChallenge;
use crate::types::AppResult;

#[derive(Serialize)]
struct JsonChallenge {
    id: i64,
    kind: ChallengeKind,
    state: ChallengeState,
    name: &'static str,
    score: u32,
    description: String,
    created: i64,
    solved: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    fingerprint: String,
}

#[derive(Serialize)]
struct JsonChallenges {
    challenges: Vec<JsonChallenge>,
}

fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn execute_list(args: ListArgs, store: SqlStore) -> AppResult<()> {
    let challenges = if args.all {
        store.get_all_challenges().await?
    } else {
        store.get_open_challenges().await?
    };

    match args.format.as_str() {
        "json" => {
            let json = JsonChallenges {
                challenges: challenges.into_iter().map(to_json).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        "records" => {
            for stored in &challenges {
                println!("{}", stored.challenge.render(stored.reason.as_deref()));
            }
        }
        _ => {
            if challenges.is_empty() {
                info!("No challenges found");
                return Ok(());
            }
            for stored in &challenges {
                print_row(stored);
            }
        }
    }
    Ok(())
}

fn to_json(stored: StoredChallenge) -> JsonChallenge {
    let challenge = &stored.challenge;
    JsonChallenge {
        id: stored.id,
        kind: challenge.kind(),
        state: stored.state,
        name: challenge.name(),
        score: challenge.score(),
        description: challenge.to_string(),
        created: challenge.created(),
        solved: challenge.solved(),
        reason: stored.reason.clone(),
        fingerprint: challenge.fingerprint().to_hex(),
    }
}

fn print_row(stored: &StoredChallenge) {
    let challenge = &stored.challenge;
    let state = match stored.state {
        ChallengeState::Solved => style(stored.state.to_string()).green(),
        ChallengeState::Unsolvable => style(stored.state.to_string()).red(),
        _ => style(stored.state.to_string()).yellow(),
    };
    let solved = if challenge.record().is_solved() {
        format!(" solved {}", format_millis(challenge.solved()))
    } else {
        String::new()
    };
    println!(
        "{:>4}  {:<10}  {:<18} {}pt  created {}{}",
        stored.id,
        state,
        challenge.name(),
        challenge.score(),
        format_millis(challenge.created()),
        solved
    );
    println!("      {}", style(challenge.to_string()).dim());
    if let Some(reason) = &stored.reason {
        println!("      reason: {reason}");
    }
}
