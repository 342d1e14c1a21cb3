use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterForm},
        pages::confirmation_error_page,
        services::{authenticate, confirm_email, register_user},
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/confirm/:token", get(confirm))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let pending = register_user(&state, form).await?;
    debug!(email = %pending.email, expires_at = %pending.expires_at, "registration pending confirmation");
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Registro recibido. Revisa tu correo para confirmar tu cuenta.".into(),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn confirm(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    match confirm_email(&state, &token).await {
        Ok(_) => Redirect::temporary(&state.config.confirmed_redirect_url()).into_response(),
        Err(AuthError::InvalidOrExpiredToken(failure)) => (
            StatusCode::BAD_REQUEST,
            Html(confirmation_error_page(failure)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let user = authenticate(&state, &payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        message: "Login exitoso".into(),
        user,
    }))
}
