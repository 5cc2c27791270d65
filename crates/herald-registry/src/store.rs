//! Device token bindings.
//!
//! A binding ties one device token to the identity that registered it. Tokens
//! are unique: saving a token that is already bound moves it to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use herald_common::{Platform, Role};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row for token {token}: {reason}")]
    Corrupt { token: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBinding {
    pub device_token: String,
    pub owner_id: String,
    pub owner_role: Role,
    pub platform: Platform,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Bind `device_token` to `owner_id`, replacing any previous owner.
    async fn upsert(
        &self,
        owner_id: &str,
        owner_role: Role,
        device_token: &str,
        platform: Platform,
    ) -> Result<Upsert, StoreError>;

    /// Drop the binding if it belongs to `owner_id`. Returns whether one was removed.
    async fn remove(&self, owner_id: &str, device_token: &str) -> Result<bool, StoreError>;

    /// All tokens bound to `owner_id`, oldest first.
    async fn tokens_for(&self, owner_id: &str) -> Result<Vec<TokenBinding>, StoreError>;
}

// ── In-memory ───────────────────────────────────────────────────────

/// Process-local store, keyed by device token. Used when no database is
/// configured and in tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    bindings: DashMap<String, TokenBinding>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn upsert(
        &self,
        owner_id: &str,
        owner_role: Role,
        device_token: &str,
        platform: Platform,
    ) -> Result<Upsert, StoreError> {
        let now = Utc::now();
        let mut outcome = Upsert::Created;
        self.bindings
            .entry(device_token.to_string())
            .and_modify(|b| {
                outcome = Upsert::Updated;
                b.owner_id = owner_id.to_string();
                b.owner_role = owner_role;
                b.platform = platform;
                b.updated_at = now;
            })
            .or_insert_with(|| TokenBinding {
                device_token: device_token.to_string(),
                owner_id: owner_id.to_string(),
                owner_role,
                platform,
                registered_at: now,
                updated_at: now,
            });
        Ok(outcome)
    }

    async fn remove(&self, owner_id: &str, device_token: &str) -> Result<bool, StoreError> {
        Ok(self
            .bindings
            .remove_if(device_token, |_, b| b.owner_id == owner_id)
            .is_some())
    }

    async fn tokens_for(&self, owner_id: &str) -> Result<Vec<TokenBinding>, StoreError> {
        let mut out: Vec<TokenBinding> = self
            .bindings
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| b.value().clone())
            .collect();
        out.sort_by_key(|b| b.registered_at);
        Ok(out)
    }
}

// ── PostgreSQL ──────────────────────────────────────────────────────

pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    /// Connect and run embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        tracing::info!("connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations complete");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

type BindingRow = (String, String, String, String, DateTime<Utc>, DateTime<Utc>);

fn binding_from_row(row: BindingRow) -> Result<TokenBinding, StoreError> {
    let (device_token, owner_id, role, platform, registered_at, updated_at) = row;
    let owner_role = role.parse::<Role>().map_err(|e| StoreError::Corrupt {
        token: device_token.clone(),
        reason: e.to_string(),
    })?;
    let platform = platform.parse::<Platform>().map_err(|e| StoreError::Corrupt {
        token: device_token.clone(),
        reason: e.to_string(),
    })?;
    Ok(TokenBinding {
        device_token,
        owner_id,
        owner_role,
        platform,
        registered_at,
        updated_at,
    })
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn upsert(
        &self,
        owner_id: &str,
        owner_role: Role,
        device_token: &str,
        platform: Platform,
    ) -> Result<Upsert, StoreError> {
        // xmax is 0 only for freshly inserted rows.
        let inserted: bool = sqlx::query_scalar(
            "INSERT INTO fcm_tokens (device_token, owner_id, owner_role, platform) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (device_token) DO UPDATE SET \
                owner_id = EXCLUDED.owner_id, \
                owner_role = EXCLUDED.owner_role, \
                platform = EXCLUDED.platform, \
                updated_at = now() \
             RETURNING (xmax = 0)",
        )
        .bind(device_token)
        .bind(owner_id)
        .bind(owner_role.as_str())
        .bind(platform.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(if inserted { Upsert::Created } else { Upsert::Updated })
    }

    async fn remove(&self, owner_id: &str, device_token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM fcm_tokens WHERE device_token = $1 AND owner_id = $2")
            .bind(device_token)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tokens_for(&self, owner_id: &str) -> Result<Vec<TokenBinding>, StoreError> {
        let rows = sqlx::query_as::<_, BindingRow>(
            "SELECT device_token, owner_id, owner_role, platform, registered_at, updated_at \
             FROM fcm_tokens WHERE owner_id = $1 ORDER BY registered_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(binding_from_row).collect()
    }
}
