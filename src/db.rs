use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{debug, info};

use crate::profile::{HistoryEntry, ProfileParams, Subscription, UserProfile};
use crate::store::{JournalEntry, JournalKind, UserStore};

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table, one document per Telegram user
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            subscription TEXT NOT NULL DEFAULT 'free',
            params JSONB,
            history JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    // Create the append-only journal tables
    for kind in [JournalKind::Progress, JournalKind::Diary] {
        let table = kind.table_name();

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ))
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create {table} table"))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_user_created ON {table} (user_id, created_at DESC)"
        ))
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create {table} index"))?;
    }

    info!("Database schema initialized successfully");
    Ok(())
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile> {
    let subscription: String = row.try_get("subscription")?;
    let params: Option<Json<ProfileParams>> = row.try_get("params")?;
    let history: Json<Vec<HistoryEntry>> = row.try_get("history")?;

    Ok(UserProfile {
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        subscription: subscription.parse::<Subscription>()?,
        params: params.map(|Json(params)| params),
        history: history.0,
    })
}

fn entry_from_row(row: &PgRow) -> Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Postgres-backed [`UserStore`]
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        init_database_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        debug!(user_id = %user_id, "Reading user profile");

        let row = sqlx::query(
            "SELECT user_id, name, subscription, params, history FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read user")?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn upsert_user(&self, user_id: &str, name: &str) -> Result<UserProfile> {
        let row = sqlx::query(
            "INSERT INTO users (user_id, name) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
             RETURNING user_id, name, subscription, params, history",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert user")?;

        info!(user_id = %user_id, "User profile upserted");
        profile_from_row(&row)
    }

    async fn save_params(&self, user_id: &str, params: &ProfileParams) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET params = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Json(params))
        .execute(&self.pool)
        .await
        .context("Failed to save profile parameters")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User {user_id} not found");
        }

        info!(user_id = %user_id, "Profile parameters saved");
        Ok(())
    }

    async fn update_goal(&self, user_id: &str, goal: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET params = jsonb_set(params, '{goal}', to_jsonb($2::text)), updated_at = NOW()
             WHERE user_id = $1 AND params IS NOT NULL",
        )
        .bind(user_id)
        .bind(goal)
        .execute(&self.pool)
        .await
        .context("Failed to update goal")?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_history(&self, user_id: &str, history: &[HistoryEntry]) -> Result<()> {
        sqlx::query("UPDATE users SET history = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(history))
            .execute(&self.pool)
            .await
            .context("Failed to save history")?;

        debug!(user_id = %user_id, entries = history.len(), "History saved");
        Ok(())
    }

    async fn add_entry(&self, user_id: &str, kind: JournalKind, text: &str) -> Result<JournalEntry> {
        let row = sqlx::query(&format!(
            "INSERT INTO {} (user_id, text) VALUES ($1, $2) RETURNING id, text, created_at",
            kind.table_name()
        ))
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to insert into {}", kind.table_name()))?;

        let entry = entry_from_row(&row)?;
        info!(user_id = %user_id, entry_id = entry.id, table = kind.table_name(), "Journal entry created");
        Ok(entry)
    }

    async fn recent_entries(
        &self,
        user_id: &str,
        kind: JournalKind,
        limit: i64,
    ) -> Result<Vec<JournalEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT id, text, created_at FROM {} WHERE user_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2",
            kind.table_name()
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to read {}", kind.table_name()))?;

        rows.iter().map(entry_from_row).collect()
    }
}
