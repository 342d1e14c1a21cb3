use std::sync::Arc;

use tracing::warn;

use crate::auth::password::{Argon2Hasher, CredentialHasher};
use crate::auth::repo::{PgUserRepository, UserRepository};
use crate::auth::tokens::{SystemClock, TokenIssuer};
use crate::config::AppConfig;
use crate::email::{EmailSender, LogEmailSender, ResendSender};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub mailer: Arc<dyn EmailSender>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let repo = PgUserRepository::connect(&config.database).await?;
        repo.migrate().await?;

        let mailer = match config.email.resend_api_key.as_deref() {
            Some(key) => Arc::new(ResendSender::new(&config.email, key)?) as Arc<dyn EmailSender>,
            None => {
                warn!("RESEND_API_KEY not set; confirmation emails will only be logged");
                Arc::new(LogEmailSender) as Arc<dyn EmailSender>
            }
        };

        let tokens = TokenIssuer::new(
            Arc::new(SystemClock),
            time::Duration::hours(config.token_ttl_hours),
        );

        Ok(Self::from_parts(
            config,
            Arc::new(repo),
            Arc::new(Argon2Hasher::default()),
            mailer,
            tokens,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        mailer: Arc<dyn EmailSender>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            config,
            users,
            hasher,
            mailer,
            tokens,
        }
    }
}
