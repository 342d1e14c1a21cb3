use std::fmt;

use anyhow::bail;

/// Longest confirmation-token lifetime accepted from the environment (30 days).
pub const MAX_TOKEN_TTL_HOURS: i64 = 720;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_secs: u64,
}

#[derive(Clone)]
pub struct EmailConfig {
    /// Resend API key. When absent, emails are only logged.
    pub resend_api_key: Option<String>,
    pub api_url: String,
    pub sender: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("api_url", &self.api_url)
            .field("sender", &self.sender)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    /// Origin of this service, used to build confirmation links.
    pub public_base_url: String,
    /// Frontend origin, target of the post-confirmation redirect.
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_timeout = env_parse("DATABASE_TIMEOUT_SECS").unwrap_or(5);
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            acquire_timeout_secs: db_timeout,
            statement_timeout_secs: env_parse("DATABASE_STATEMENT_TIMEOUT_SECS")
                .unwrap_or(db_timeout),
        };
        let token_ttl_hours =
            parse_token_ttl(std::env::var("CONFIRMATION_TOKEN_TTL_HOURS").ok().as_deref())?;
        let email = EmailConfig {
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_url: std::env::var("RESEND_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".into()),
            sender: std::env::var("EMAIL_SENDER")
                .unwrap_or_else(|_| "CrackSchool@hotmail.com".into()),
            timeout_secs: env_parse("EMAIL_TIMEOUT_SECS").unwrap_or(10),
        };
        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8080),
            database,
            email,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            cors_origins,
            token_ttl_hours,
        })
    }

    /// Link embedded in the confirmation email.
    pub fn confirmation_url(&self, token: &str) -> String {
        format!(
            "{}/auth/confirm/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }

    /// Where the browser lands after a successful confirmation.
    pub fn confirmed_redirect_url(&self) -> String {
        format!(
            "{}/login?confirmed=true",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Defaults to 24 when unset; anything unparsable or outside `1..=720` is a startup error.
fn parse_token_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(24);
    };
    let hours: i64 = raw.trim().parse().map_err(|_| {
        anyhow::anyhow!("CONFIRMATION_TOKEN_TTL_HOURS must be a whole number of hours, got {raw:?}")
    })?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        bail!("CONFIRMATION_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect()
}
