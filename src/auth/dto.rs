use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;

/// Form body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub telefono: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub email: String,
    pub nombres: String,
    pub apellidos: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            email: u.email,
            nombres: u.nombres,
            apellidos: u.apellidos,
        }
    }
}
