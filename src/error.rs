use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Why a confirmation token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFailure {
    Invalid,
    Expired,
}

impl std::fmt::Display for TokenFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenFailure::Invalid => f.write_str("invalid"),
            TokenFailure::Expired => f.write_str("expired"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("a confirmed account already owns this email")]
    DuplicateUser,
    #[error("confirmation email could not be delivered")]
    Notification(#[source] anyhow::Error),
    #[error("datastore failure")]
    Persistence(#[source] anyhow::Error),
    #[error("confirmation token is {0}")]
    InvalidOrExpiredToken(TokenFailure),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::DuplicateUser
            | AuthError::InvalidOrExpiredToken(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Notification(_) | AuthError::Persistence(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::DuplicateUser => "El correo electrónico ya está registrado".into(),
            AuthError::Notification(_) => {
                "No se pudo enviar el correo de confirmación. Inténtalo de nuevo más tarde.".into()
            }
            AuthError::InvalidOrExpiredToken(TokenFailure::Invalid) => {
                "El enlace de confirmación no es válido".into()
            }
            AuthError::InvalidOrExpiredToken(TokenFailure::Expired) => {
                "El enlace de confirmación ha expirado".into()
            }
            AuthError::Unauthorized => "Credenciales incorrectas".into(),
            AuthError::Persistence(_) | AuthError::Internal(_) => {
                "Ocurrió un error en el servidor".into()
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let body = Json(json!({ "detail": self.public_message() }));
        if matches!(self, AuthError::Unauthorized) {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
