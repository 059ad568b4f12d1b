use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use crate::core::challenges::{Challenge, ChallengeLifecycle, ChallengeState};
use crate::types::{StoreError, StoreResult};

/// The challenge pool. One row per distinct challenge; the rendered record is the payload and
/// the fingerprint keeps duplicates out.
#[derive(Clone, Debug)]
pub struct SqlStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct StoredChallenge {
    pub id: i64,
    pub state: ChallengeState,
    pub reason: Option<String>,
    pub challenge: Challenge,
}

#[derive(Debug, Default, Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub open: usize,
    pub solved: usize,
    pub discarded: usize,
    pub points_earned: u32,
}

impl SqlStore {
    pub async fn new(sqlite_connection_string: String) -> StoreResult<Self> {
        let pool = SqlitePool::connect(&sqlite_connection_string).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns `None` if an equal challenge is already pooled, otherwise the new id.
    pub async fn add_challenge(&self, challenge: &Challenge) -> StoreResult<Option<i64>> {
        let fingerprint = challenge.fingerprint().to_hex();
        let existing = sqlx::query("SELECT id FROM challenges WHERE fingerprint = ?")
            .bind(&fingerprint)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let state = if challenge.record().is_solved() {
            ChallengeState::Solved
        } else {
            ChallengeState::Created
        };
        let result = sqlx::query(
            r#"
            INSERT INTO challenges (fingerprint, kind, record, created, solved, state)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fingerprint)
        .bind(challenge.kind().to_string())
        .bind(challenge.render(None))
        .bind(challenge.created())
        .bind(challenge.solved())
        .bind(state.to_string())
        .execute(&self.pool)
        .await?;
        Ok(Some(result.last_insert_rowid()))
    }

    /// Persists the outcome of an evaluation. The stored solve stamp only moves from 0 to a
    /// time, never back.
    pub async fn update_challenge(
        &self,
        id: i64,
        challenge: &Challenge,
        state: ChallengeState,
        reason: Option<&str>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE challenges
            SET record = ?, solved = CASE WHEN solved = 0 THEN ? ELSE solved END, state = ?, reason = ?
            WHERE id = ?
            "#,
        )
        .bind(challenge.render(reason))
        .bind(challenge.solved())
        .bind(state.to_string())
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub async fn get_challenge(&self, id: i64) -> StoreResult<StoredChallenge> {
        let row = sqlx::query("SELECT id, record, state, reason FROM challenges WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        stored_from_row(&row)
    }

    /// Challenges not yet solved or discarded, oldest first.
    pub async fn get_open_challenges(&self) -> StoreResult<Vec<StoredChallenge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, record, state, reason
            FROM challenges
            WHERE state IN ('Created', 'Solvable')
            ORDER BY created, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(stored_from_row).collect()
    }

    pub async fn get_all_challenges(&self) -> StoreResult<Vec<StoredChallenge>> {
        let rows = sqlx::query("SELECT id, record, state, reason FROM challenges ORDER BY created, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(stored_from_row).collect()
    }

    pub async fn get_pool_stats(&self) -> StoreResult<PoolStats> {
        let mut stats = PoolStats::default();
        for stored in self.get_all_challenges().await? {
            stats.total += 1;
            match stored.state {
                ChallengeState::Created | ChallengeState::Solvable => stats.open += 1,
                ChallengeState::Solved => {
                    stats.solved += 1;
                    stats.points_earned += stored.challenge.score();
                }
                ChallengeState::Unsolvable => stats.discarded += 1,
            }
        }
        Ok(stats)
    }

    /// Deletes closed challenges: only solved ones, or solved and discarded ones with `all`.
    pub async fn purge(&self, all: bool) -> StoreResult<u64> {
        let query = if all {
            "DELETE FROM challenges WHERE state IN ('Solved', 'Unsolvable')"
        } else {
            "DELETE FROM challenges WHERE state = 'Solved'"
        };
        let result = sqlx::query(query).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn stored_from_row(row: &SqliteRow) -> StoreResult<StoredChallenge> {
    let state: String = row.try_get("state")?;
    let record: String = row.try_get("record")?;
    Ok(StoredChallenge {
        id: row.try_get("id")?,
        state: state
            .parse()
            .map_err(|_| StoreError::InvalidState(state.clone()))?,
        reason: row.try_get("reason")?,
        challenge: Challenge::parse(&record)?,
    })
}
