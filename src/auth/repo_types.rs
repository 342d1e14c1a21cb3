use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,                            // unique, case preserved
    pub nombres: String,
    pub apellidos: String,
    pub telefono: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,                    // Argon2 PHC string, not exposed in JSON
    pub is_email_confirmed: bool,
    #[serde(skip_serializing)]
    pub confirmation_token: Option<String>,       // cleared once redeemed
    pub token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Fields written when a registration starts or restarts.
#[derive(Debug, Clone)]
pub struct PendingUser {
    pub email: String,
    pub nombres: String,
    pub apellidos: String,
    pub telefono: Option<String>,
    pub password_hash: String,
    pub confirmation_token: String,
    pub token_expiry: OffsetDateTime,
}
