use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use time::OffsetDateTime;

use crate::auth::repo_types::{PendingUser, User};
use crate::config::DatabaseConfig;

/// Narrow view of the credential store used by the auth workflows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<User>>;

    /// Insert a pending user, or overwrite the pending user with the same email.
    ///
    /// Returns `None` when a confirmed account already owns the email.
    async fn upsert_pending(&self, pending: &PendingUser) -> anyhow::Result<Option<User>>;

    /// Confirm the user holding `token` if it is still pending and unexpired at `now`,
    /// clearing the token in the same write. Returns `None` if nothing was updated.
    async fn mark_confirmed(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;
}

const USER_COLUMNS: &str = "id, email, nombres, apellidos, telefono, password_hash, \
     is_email_confirmed, confirmation_token, token_expiry, created_at";

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

/// Server-side cap on any single statement, in the milliseconds Postgres expects.
fn statement_timeout_ms(secs: u64) -> String {
    secs.saturating_mul(1000).to_string()
}

fn connect_options(cfg: &DatabaseConfig) -> anyhow::Result<PgConnectOptions> {
    let opts = PgConnectOptions::from_str(&cfg.url).context("parse DATABASE_URL")?;
    Ok(opts.options([(
        "statement_timeout",
        statement_timeout_ms(cfg.statement_timeout_secs),
    )]))
}

impl PgUserRepository {
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect_with(connect_options(cfg)?)
            .await
            .context("connect to database")?;
        Ok(Self::from_pool(db))
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE confirmation_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("find user by token")?;
        Ok(user)
    }

    async fn upsert_pending(&self, pending: &PendingUser) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (email, nombres, apellidos, telefono, password_hash,
                 is_email_confirmed, confirmation_token, token_expiry)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                nombres = EXCLUDED.nombres,
                apellidos = EXCLUDED.apellidos,
                telefono = EXCLUDED.telefono,
                password_hash = EXCLUDED.password_hash,
                confirmation_token = EXCLUDED.confirmation_token,
                token_expiry = EXCLUDED.token_expiry,
                updated_at = now()
            WHERE users.is_email_confirmed = FALSE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&pending.email)
        .bind(&pending.nombres)
        .bind(&pending.apellidos)
        .bind(&pending.telefono)
        .bind(&pending.password_hash)
        .bind(&pending.confirmation_token)
        .bind(pending.token_expiry)
        .fetch_optional(&self.db)
        .await
        .context("upsert pending user")?;
        Ok(user)
    }

    async fn mark_confirmed(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                is_email_confirmed = TRUE,
                confirmation_token = NULL,
                token_expiry = NULL,
                updated_at = now()
            WHERE confirmation_token = $1
              AND is_email_confirmed = FALSE
              AND token_expiry > $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("mark user confirmed")?;
        Ok(user)
    }
}
