//! # Authentication API Handlers
//!
//! Login (public) and the current-user endpoint.

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, CurrentUser};
use crate::error::{ApiError, validation_error};
use crate::handlers::users::UserResponse;
use crate::models::Role;
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@univ.mg")]
    pub email: Option<String>,
    /// Also accepted as `mot_de_passe`
    #[serde(alias = "mot_de_passe")]
    #[schema(example = "s3cret")]
    pub password: Option<String>,
}

/// Issued access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed token to send back in the `Authorization` header
    pub token: String,
    pub role: Role,
    /// Expiry instant (RFC 3339)
    #[schema(example = "2024-05-11T08:00:00Z")]
    pub expires_at: String,
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ApiError),
        (status = 401, description = "Identifiants incorrects", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(validation_error(
            "Champs requis manquants",
            serde_json::json!({ "required": ["email", "password"] }),
        ));
    }

    let outcome = auth::login(&state, email, password).await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
        role: outcome.user.role,
        expires_at: outcome.token.expires_at.to_rfc3339(),
    }))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(&state.db)
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| crate::error::unauthorized(Some(auth::INVALID_TOKEN)))?;

    Ok(Json(UserResponse::from(user)))
}
