use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::lenient::string_list_from_value;
use crate::models::{PartnerProfile, SkillLevel, UpdateProfileRequest};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

const PROFILE_COLUMNS: &str = r#"
    id, name, skill_level, primary_goals, coaching_style_preference,
    preferred_days, location, latitude, longitude, rating, last_active_at
"#;

/// PostgreSQL-backed candidate repository
///
/// Reads partner profiles out of the shared `users` table. Only users who have
/// completed onboarding are offered as candidates.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool without running migrations
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one user's partner profile
    pub async fn get_profile(&self, user_id: &str) -> Result<PartnerProfile, PostgresError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("User {} not found", user_id)))?;

        profile_from_row(&row)
    }

    /// List onboarded users other than `user_id`, in a stable order
    pub async fn list_candidates(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<PartnerProfile>, PostgresError> {
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE onboarding_completed = TRUE AND id <> $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2
            "#,
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} candidates for {}", candidates.len(), user_id);

        Ok(candidates)
    }

    /// Store a user's partner-matching fields and mark onboarding complete
    pub async fn update_partner_profile(
        &self,
        user_id: &str,
        update: &UpdateProfileRequest,
    ) -> Result<PartnerProfile, PostgresError> {
        let query = format!(
            r#"
            UPDATE users SET
                skill_level = $2,
                primary_goals = $3,
                coaching_style_preference = $4,
                preferred_days = $5,
                location = $6,
                latitude = $7,
                longitude = $8,
                onboarding_completed = TRUE,
                last_active_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(update.skill_level.as_str())
            .bind(Value::from(update.primary_goals.clone()))
            .bind(update.coaching_style_preference.as_deref())
            .bind(Value::from(update.preferred_days.clone()))
            .bind(update.location.as_deref())
            .bind(update.latitude)
            .bind(update.longitude)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("User {} not found", user_id)))?;

        tracing::info!("Updated partner profile for {}", user_id);

        profile_from_row(&row)
    }

    /// Record activity for the availability flag
    pub async fn touch_last_active(&self, user_id: &str) -> Result<(), PostgresError> {
        sqlx::query("UPDATE users SET last_active_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Map a `users` row onto a profile, coercing loosely typed columns
fn profile_from_row(row: &PgRow) -> Result<PartnerProfile, PostgresError> {
    let skill_level: Option<String> = row.try_get("skill_level")?;
    let primary_goals: Option<Value> = row.try_get("primary_goals")?;
    let preferred_days: Option<Value> = row.try_get("preferred_days")?;
    let style: Option<String> = row.try_get("coaching_style_preference")?;
    let location: Option<String> = row.try_get("location")?;

    Ok(PartnerProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        skill_level: skill_level
            .as_deref()
            .map(SkillLevel::parse_lenient)
            .unwrap_or_default(),
        primary_goals: primary_goals
            .as_ref()
            .map(string_list_from_value)
            .unwrap_or_default(),
        coaching_style_preference: style.filter(|s| !s.trim().is_empty()),
        preferred_days: preferred_days
            .as_ref()
            .map(string_list_from_value)
            .unwrap_or_default(),
        location: location.filter(|l| !l.trim().is_empty()),
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        rating: row.try_get("rating")?,
        last_active_at: row.try_get("last_active_at")?,
    })
}
