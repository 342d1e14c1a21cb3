use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod pages;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod tokens;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
