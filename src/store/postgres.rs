use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use super::StoreError;
use crate::badges::{BadgeCriteria, BadgeModel, BadgeRepository};
use crate::hall::{HallEntry, HallKind, HallRepository};
use crate::matches::{
    Comment, MatchCommit, MatchFilter, MatchModel, MatchRepository, MatchWinner, PlayerStats,
    StatIncrement, TeamSide,
};
use crate::milestones::{MilestoneModel, MilestoneRepository};
use crate::stats::StatKey;
use crate::user::{AggregateStats, UserModel, UserRepository};

const UNIQUE_VIOLATION: &str = "23505";

const USER_COLUMNS: &str = "id, name, real_name, team_name, avatar_url, badges, wins, losses, \
    draws, goals_for, goals_against, shots, shots_on_target, passes, successful_passes, tackles, \
    saves, red_cards, fouls, total_possession, created_at";

const MATCH_COLUMNS: &str = "id, created_by, opponent_id, participants, date, comments, roast, \
    winner_id, opponent_name, team1_name, team2_name, team1_stats, team2_stats, fingerprint, \
    user_team_side";

const HALL_COLUMNS: &str =
    "id, kind, title, headline, subject_id, opponent_id, match_id, stat, roast, created_at";

/// Postgres-backed store. One transaction per match commit; the unique
/// index on `matches.fingerprint` is the final word on duplicates.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled SQL migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn apply_increment(
        tx: &mut Transaction<'_, Postgres>,
        increment: &StatIncrement,
    ) -> Result<(), StoreError> {
        let delta = &increment.delta;
        let result = sqlx::query(
            "UPDATE users SET wins = wins + $2, losses = losses + $3, draws = draws + $4, \
             goals_for = goals_for + $5, goals_against = goals_against + $6, shots = shots + $7, \
             shots_on_target = shots_on_target + $8, passes = passes + $9, \
             successful_passes = successful_passes + $10, tackles = tackles + $11, \
             saves = saves + $12, red_cards = red_cards + $13, fouls = fouls + $14, \
             total_possession = total_possession + $15 WHERE id = $1",
        )
        .bind(&increment.user_id)
        .bind(i64::from(delta.wins))
        .bind(i64::from(delta.losses))
        .bind(i64::from(delta.draws))
        .bind(i64::from(delta.goals_for))
        .bind(i64::from(delta.goals_against))
        .bind(i64::from(delta.shots))
        .bind(i64::from(delta.shots_on_target))
        .bind(i64::from(delta.passes))
        .bind(i64::from(delta.successful_passes))
        .bind(i64::from(delta.tackles))
        .bind(i64::from(delta.saves))
        .bind(i64::from(delta.red_cards))
        .bind(i64::from(delta.fouls))
        .bind(i64::from(delta.total_possession))
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            warn!(user_id = %increment.user_id, "Participant missing, rolling back commit");
            return Err(StoreError::NotFound(format!("user {}", increment.user_id)));
        }
        Ok(())
    }
}

fn count(row: &PgRow, column: &str) -> Result<u32, StoreError> {
    let value: i64 = row.try_get(column)?;
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

fn parse_column<T: FromStr>(row: &PgRow, column: &str) -> Result<T, StoreError> {
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|_| StoreError::Database(format!("unexpected {} value: {}", column, raw)))
}

fn user_from_row(row: &PgRow) -> Result<UserModel, StoreError> {
    Ok(UserModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        real_name: row.try_get("real_name")?,
        team_name: row.try_get("team_name")?,
        avatar_url: row.try_get("avatar_url")?,
        badges: row.try_get("badges")?,
        stats: AggregateStats {
            wins: count(row, "wins")?,
            losses: count(row, "losses")?,
            draws: count(row, "draws")?,
            goals_for: count(row, "goals_for")?,
            goals_against: count(row, "goals_against")?,
            shots: count(row, "shots")?,
            shots_on_target: count(row, "shots_on_target")?,
            passes: count(row, "passes")?,
            successful_passes: count(row, "successful_passes")?,
            tackles: count(row, "tackles")?,
            saves: count(row, "saves")?,
            red_cards: count(row, "red_cards")?,
            fouls: count(row, "fouls")?,
            total_possession: count(row, "total_possession")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<MatchModel, StoreError> {
    let comments: Json<Vec<Comment>> = row.try_get("comments")?;
    let team1_stats: Json<PlayerStats> = row.try_get("team1_stats")?;
    let team2_stats: Json<PlayerStats> = row.try_get("team2_stats")?;
    let winner: String = row.try_get("winner_id")?;

    Ok(MatchModel {
        id: row.try_get("id")?,
        created_by: row.try_get("created_by")?,
        opponent_id: row.try_get("opponent_id")?,
        participants: row.try_get("participants")?,
        date: row.try_get("date")?,
        comments: comments.0,
        roast: row.try_get("roast")?,
        winner: MatchWinner::from(winner),
        opponent_name: row.try_get("opponent_name")?,
        team1_name: row.try_get("team1_name")?,
        team2_name: row.try_get("team2_name")?,
        team1_stats: team1_stats.0,
        team2_stats: team2_stats.0,
        fingerprint: row.try_get("fingerprint")?,
        user_team_side: parse_column::<TeamSide>(row, "user_team_side")?,
    })
}

fn badge_from_row(row: &PgRow) -> Result<BadgeModel, StoreError> {
    let criteria: Json<BadgeCriteria> = row.try_get("criteria")?;
    Ok(BadgeModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        criteria: criteria.0,
        created_at: row.try_get("created_at")?,
    })
}

fn hall_from_row(row: &PgRow) -> Result<HallEntry, StoreError> {
    Ok(HallEntry {
        id: row.try_get("id")?,
        kind: parse_column::<HallKind>(row, "kind")?,
        title: row.try_get("title")?,
        headline: row.try_get("headline")?,
        subject_id: row.try_get("subject_id")?,
        opponent_id: row.try_get("opponent_id")?,
        match_id: row.try_get("match_id")?,
        stat: row.try_get("stat")?,
        roast: row.try_get("roast")?,
        created_at: row.try_get("created_at")?,
    })
}

fn milestone_from_row(row: &PgRow) -> Result<MilestoneModel, StoreError> {
    Ok(MilestoneModel {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        stat: parse_column::<StatKey>(row, "stat")?,
        target: count(row, "target")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Unique-index violations on insert mean another commit won the race
fn duplicate_or(err: sqlx::Error, fingerprint: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::DuplicateFingerprint(fingerprint.to_string());
        }
    }
    err.into()
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, real_name, team_name, avatar_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.real_name)
        .bind(&user.team_name)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            StoreError::from(e)
        })?;

        debug!("User created in database");
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserModel>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at, id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, badge_ids))]
    async fn award_badges(
        &self,
        user_id: &str,
        badge_ids: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let held: Vec<String> = sqlx::query("SELECT badges FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?
            .try_get("badges")?;

        let mut added: Vec<String> = Vec::new();
        for badge_id in badge_ids {
            if !held.contains(badge_id) && !added.contains(badge_id) {
                added.push(badge_id.clone());
            }
        }

        if !added.is_empty() {
            sqlx::query("UPDATE users SET badges = badges || $2 WHERE id = $1")
                .bind(user_id)
                .bind(&added)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(added)
    }
}

#[async_trait]
impl MatchRepository for PostgresStore {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<MatchModel>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE fingerprint = $1",
            MATCH_COLUMNS
        ))
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(match_from_row).transpose()
    }

    #[instrument(skip(self, commit), fields(match_id = %commit.record.id))]
    async fn commit_match(&self, commit: &MatchCommit) -> Result<(), StoreError> {
        let record = &commit.record;
        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query("SELECT id FROM matches WHERE fingerprint = $1 FOR UPDATE")
            .bind(&record.fingerprint)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            warn!(fingerprint = %record.fingerprint, "Fingerprint taken inside transaction");
            return Err(StoreError::DuplicateFingerprint(record.fingerprint.clone()));
        }

        for increment in &commit.increments {
            Self::apply_increment(&mut tx, increment).await?;
        }

        sqlx::query(&format!(
            "INSERT INTO matches ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
            MATCH_COLUMNS
        ))
        .bind(&record.id)
        .bind(&record.created_by)
        .bind(&record.opponent_id)
        .bind(&record.participants)
        .bind(record.date)
        .bind(Json(&record.comments))
        .bind(&record.roast)
        .bind(record.winner.as_str())
        .bind(&record.opponent_name)
        .bind(&record.team1_name)
        .bind(&record.team2_name)
        .bind(Json(&record.team1_stats))
        .bind(Json(&record.team2_stats))
        .bind(&record.fingerprint)
        .bind(record.user_team_side.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_or(e, &record.fingerprint))?;

        tx.commit()
            .await
            .map_err(|e| duplicate_or(e, &record.fingerprint))?;

        info!("Match committed in database");
        Ok(())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<MatchModel>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS))
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchModel>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM matches \
             WHERE ($1::timestamptz IS NULL OR date >= $1) \
               AND ($2::text IS NULL OR $2 = ANY(participants)) \
             ORDER BY date DESC",
            MATCH_COLUMNS
        ))
        .bind(filter.since)
        .bind(filter.participant.as_deref())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    async fn set_roast(&self, match_id: &str, roast: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE matches SET roast = $2 WHERE id = $1")
            .bind(match_id)
            .bind(roast)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("match {}", match_id)));
        }
        Ok(())
    }

    async fn add_comment(&self, match_id: &str, comment: &Comment) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE matches SET comments = comments || $2 WHERE id = $1")
            .bind(match_id)
            .bind(Json(vec![comment]))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("match {}", match_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BadgeRepository for PostgresStore {
    async fn list_badges(&self) -> Result<Vec<BadgeModel>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, description, icon, criteria, created_at FROM badges \
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(badge_from_row).collect()
    }

    async fn create_badge(&self, badge: &BadgeModel) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO badges (id, name, description, icon, criteria, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&badge.id)
        .bind(&badge.name)
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(Json(&badge.criteria))
        .bind(badge.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_badge_description(
        &self,
        badge_id: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE badges SET description = $2 WHERE id = $1")
            .bind(badge_id)
            .bind(description)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("badge {}", badge_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl HallRepository for PostgresStore {
    async fn create_entries(&self, entries: &[HallEntry]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(&format!(
                "INSERT INTO hall_entries ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                HALL_COLUMNS
            ))
            .bind(&entry.id)
            .bind(entry.kind.to_string())
            .bind(&entry.title)
            .bind(&entry.headline)
            .bind(&entry.subject_id)
            .bind(&entry.opponent_id)
            .bind(&entry.match_id)
            .bind(&entry.stat)
            .bind(&entry.roast)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_entries(&self, limit: usize) -> Result<Vec<HallEntry>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM hall_entries ORDER BY created_at DESC LIMIT $1",
            HALL_COLUMNS
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(hall_from_row).collect()
    }

    async fn entries_for_match(&self, match_id: &str) -> Result<Vec<HallEntry>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM hall_entries WHERE match_id = $1",
            HALL_COLUMNS
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(hall_from_row).collect()
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<HallEntry>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM hall_entries WHERE id = $1",
            HALL_COLUMNS
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(hall_from_row).transpose()
    }

    async fn update_entry_roast(&self, entry_id: &str, roast: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE hall_entries SET roast = $2 WHERE id = $1")
            .bind(entry_id)
            .bind(roast)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("hall entry {}", entry_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl MilestoneRepository for PostgresStore {
    async fn list_milestones(&self) -> Result<Vec<MilestoneModel>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, description, stat, target, created_at FROM milestones \
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(milestone_from_row).collect()
    }

    async fn create_milestone(&self, milestone: &MilestoneModel) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO milestones (id, title, description, stat, target, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (title) DO NOTHING",
        )
        .bind(&milestone.id)
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.stat.to_string())
        .bind(i64::from(milestone.target))
        .bind(milestone.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
