use std::sync::Arc;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::auth::dto::{PublicUser, RegisterForm};
use crate::auth::password::CredentialHasher;
use crate::auth::repo_types::{PendingUser, User};
use crate::email::templates::confirmation_email;
use crate::error::{AuthError, TokenFailure};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Run Argon2 work on the blocking pool so it does not stall async workers.
async fn run_hasher<T, F>(hasher: &Arc<dyn CredentialHasher>, work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn CredentialHasher) -> anyhow::Result<T> + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || work(hasher.as_ref()))
        .await
        .context("password hashing task failed")?
}

/// Outcome of a registration that reached the mailer.
#[derive(Debug)]
pub struct PendingRegistration {
    pub email: String,
    pub expires_at: OffsetDateTime,
}

/// Start (or restart) a registration: store a pending user and email a confirmation link.
pub async fn register_user(
    state: &AppState,
    form: RegisterForm,
) -> Result<PendingRegistration, AuthError> {
    let email = form.email.trim().to_string();
    let nombres = form.nombres.trim().to_string();
    let apellidos = form.apellidos.trim().to_string();
    let telefono = form
        .telefono
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if form.password != form.confirm_password {
        return Err(AuthError::Validation("Las contraseñas no coinciden".into()));
    }
    if !is_valid_email(&email) {
        return Err(AuthError::Validation("Correo electrónico inválido".into()));
    }
    if nombres.is_empty() || apellidos.is_empty() {
        return Err(AuthError::Validation(
            "Nombres y apellidos son obligatorios".into(),
        ));
    }

    match state.users.find_by_email(&email).await {
        Ok(Some(existing)) if existing.is_email_confirmed => {
            warn!(email = %email, "registration for confirmed email");
            return Err(AuthError::DuplicateUser);
        }
        Ok(Some(_)) => debug!(email = %email, "restarting pending registration"),
        Ok(None) => {}
        Err(e) => return Err(AuthError::Persistence(e)),
    }

    let plain = form.password;
    let password_hash = run_hasher(&state.hasher, move |h| h.hash(&plain))
        .await
        .map_err(AuthError::Internal)?;
    let token = state.tokens.issue().map_err(AuthError::Internal)?;

    let pending = PendingUser {
        email: email.clone(),
        nombres,
        apellidos,
        telefono,
        password_hash,
        confirmation_token: token.value.clone(),
        token_expiry: token.expires_at,
    };

    let user = match state.users.upsert_pending(&pending).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            // confirmed between the lookup and the write
            warn!(email = %email, "email confirmed concurrently");
            return Err(AuthError::DuplicateUser);
        }
        Err(e) => return Err(AuthError::Persistence(e)),
    };

    let url = state.config.confirmation_url(&token.value);
    let (subject, html) = confirmation_email(&url, state.config.token_ttl_hours);
    if let Err(e) = state.mailer.send(&user.email, &subject, &html).await {
        error!(error = ?e, email = %user.email, "confirmation email failed");
        return Err(AuthError::Notification(e));
    }

    info!(user_id = %user.id, email = %user.email, "confirmation email sent");
    Ok(PendingRegistration {
        email: user.email,
        expires_at: token.expires_at,
    })
}

/// Redeem a confirmation token, flipping the user to confirmed.
pub async fn confirm_email(state: &AppState, token: &str) -> Result<User, AuthError> {
    if token.is_empty() {
        return Err(AuthError::InvalidOrExpiredToken(TokenFailure::Invalid));
    }

    let user = state
        .users
        .find_by_token(token)
        .await
        .map_err(AuthError::Persistence)?
        .ok_or_else(|| {
            warn!("confirmation with unknown token");
            AuthError::InvalidOrExpiredToken(TokenFailure::Invalid)
        })?;

    match user.token_expiry {
        Some(expiry) if !state.tokens.is_expired(expiry) => {}
        _ => {
            warn!(user_id = %user.id, "confirmation with expired token");
            return Err(AuthError::InvalidOrExpiredToken(TokenFailure::Expired));
        }
    }

    let confirmed = state
        .users
        .mark_confirmed(token, state.tokens.now())
        .await
        .map_err(AuthError::Persistence)?
        .ok_or_else(|| {
            // another request redeemed it first
            warn!(user_id = %user.id, "token already redeemed");
            AuthError::InvalidOrExpiredToken(TokenFailure::Invalid)
        })?;

    info!(user_id = %confirmed.id, email = %confirmed.email, "email confirmed");
    Ok(confirmed)
}

/// Check credentials of a confirmed user. Every failure collapses to `Unauthorized`.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<PublicUser, AuthError> {
    let email = email.trim();

    let user = match state.users.find_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            let plain = password.to_string();
            let _ = run_hasher(&state.hasher, move |h| {
                h.verify_decoy(&plain);
                Ok(())
            })
            .await;
            warn!(email = %email, "login unknown email");
            return Err(AuthError::Unauthorized);
        }
        Err(e) => return Err(AuthError::Persistence(e)),
    };

    let plain = password.to_string();
    let digest = user.password_hash.clone();
    let verified = run_hasher(&state.hasher, move |h| {
        h.verify(&plain, &digest).map_err(|e| {
            h.verify_decoy(&plain);
            e
        })
    })
    .await;
    let ok = match verified {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "stored password digest unreadable");
            false
        }
    };
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AuthError::Unauthorized);
    }

    if !user.is_email_confirmed {
        warn!(email = %email, user_id = %user.id, "login before email confirmation");
        return Err(AuthError::Unauthorized);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(user.into())
}
