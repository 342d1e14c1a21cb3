use std::sync::Arc;

use anyhow::Context;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::debug;

/// Number of random bytes behind each confirmation token.
const TOKEN_BYTES: usize = 32;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmationToken {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

/// Issues single-use email confirmation tokens and judges their expiry.
#[derive(Clone)]
pub struct TokenIssuer {
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { clock, ttl }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now().to_offset(UtcOffset::UTC)
    }

    pub fn issue(&self) -> anyhow::Result<ConfirmationToken> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate confirmation token")?;
        let expires_at = self.now() + self.ttl;
        debug!(%expires_at, "confirmation token issued");
        Ok(ConfirmationToken {
            value: Base64UrlUnpadded::encode_string(&bytes),
            expires_at,
        })
    }

    /// A token is usable only while `now < expiry`.
    pub fn is_expired(&self, expiry: OffsetDateTime) -> bool {
        expiry.to_offset(UtcOffset::UTC) <= self.now()
    }
}
