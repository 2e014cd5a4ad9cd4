//! Score repository: the persistent ledger behind the engine.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use strictly_wordchain::{LedgerError, PlayerId, ScoreLedger};
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewScore, Score, schema::scores};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite-backed score ledger.
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    db_path: String,
}

impl ScoreRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip_all)]
    pub fn open(db_path: impl Into<String>) -> Result<Self, DbError> {
        let repo = Self {
            db_path: db_path.into(),
        };
        info!(path = %repo.db_path, "Opening score database");

        let mut conn = repo.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(migrations = applied.len(), "Score database ready");
        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Adds `amount` to a player's points and returns the new total.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn add_points(&self, player_id: &str, amount: i64) -> Result<i64, DbError> {
        let mut conn = self.connection()?;

        let total = conn.transaction::<_, DbError, _>(|conn| {
            let current = scores::table
                .find(player_id)
                .select(scores::points)
                .first::<i64>(conn)
                .optional()?;
            let total = current.unwrap_or(0) + amount;
            let now = chrono::Utc::now().naive_utc();

            diesel::insert_into(scores::table)
                .values(&NewScore::new(player_id.to_string(), total, now))
                .on_conflict(scores::player_id)
                .do_update()
                .set((scores::points.eq(total), scores::updated_at.eq(now)))
                .execute(conn)?;
            Ok(total)
        })?;

        info!(total, "Points credited");
        Ok(total)
    }

    /// A player's points; zero for players never credited.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn points(&self, player_id: &str) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let points = scores::table
            .find(player_id)
            .select(scores::points)
            .first::<i64>(&mut conn)
            .optional()?;
        Ok(points.unwrap_or(0))
    }

    /// Top `limit` scores, highest first, ties broken by player id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: i64) -> Result<Vec<Score>, DbError> {
        let mut conn = self.connection()?;
        let top = scores::table
            .order((scores::points.desc(), scores::player_id.asc()))
            .limit(limit)
            .select(Score::as_select())
            .load(&mut conn)?;
        debug!(count = top.len(), "Leaderboard loaded");
        Ok(top)
    }

    /// 1-based position on the leaderboard, or `None` for unranked players.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn rank(&self, player_id: &str) -> Result<Option<i64>, DbError> {
        let mut conn = self.connection()?;
        let Some(points) = scores::table
            .find(player_id)
            .select(scores::points)
            .first::<i64>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let ahead: i64 = scores::table
            .filter(
                scores::points
                    .gt(points)
                    .or(scores::points.eq(points).and(scores::player_id.lt(player_id))),
            )
            .count()
            .get_result(&mut conn)?;
        Ok(Some(ahead + 1))
    }

    /// Deletes every score. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(scores::table).execute(&mut conn)?;
        info!(removed, "Scores reset");
        Ok(removed)
    }
}

impl ScoreLedger for ScoreRepository {
    fn credit(&self, player: &PlayerId, amount: i64) -> Result<i64, LedgerError> {
        Ok(self.add_points(player.as_str(), amount)?)
    }

    fn read(&self, player: &PlayerId) -> Result<i64, LedgerError> {
        Ok(self.points(player.as_str())?)
    }
}
