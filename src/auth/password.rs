use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::{Arc, OnceLock};
use tracing::error;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Pluggable password hashing used for stored credentials.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when the digest cannot be parsed.
    fn verify(&self, plain: &str, digest: &str) -> anyhow::Result<bool>;

    /// Spend the same work as a real `verify` when there is no usable digest,
    /// so response time does not tell unknown accounts apart.
    fn verify_decoy(&self, plain: &str);
}

#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy: Arc<OnceLock<Option<String>>>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: Arc::default(),
        }
    }
}

impl Argon2Hasher {
    /// Argon2id with explicit memory (KiB), iteration and lane costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: Arc::default(),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, digest: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(digest).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    fn verify_decoy(&self, plain: &str) {
        // digest of the decoy is built with this hasher's own params
        let decoy = self.decoy.get_or_init(|| self.hash(DECOY_PASSWORD).ok());
        if let Some(digest) = decoy {
            let _ = self.verify(plain, digest);
        }
    }
}
