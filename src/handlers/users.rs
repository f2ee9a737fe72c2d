//! # Users API Handlers

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::Role;
use crate::models::user::Model as UserModel;
use crate::repositories::{NewUser, UserRepository};
use crate::server::AppState;

/// Request payload for creating a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Rakoto")]
    pub last_name: String,
    #[schema(example = "Jean")]
    pub first_name: String,
    #[schema(example = "jean.rakoto@univ.mg")]
    pub email: String,
    /// Also accepted as `mot_de_passe`
    #[serde(alias = "mot_de_passe")]
    pub password: String,
    /// `admin` or `enseignant` (default)
    #[schema(example = "enseignant")]
    pub role: Option<String>,
}

/// User as exposed by the API; the credential hash never leaves the store
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    /// `"<last> <first>"`
    #[schema(example = "Rakoto Jean")]
    pub name: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: Role,
    /// Last successful login (RFC 3339)
    pub last_login_at: Option<String>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.full_name(),
            last_login_at: user.last_login_at.map(|at| at.to_rfc3339()),
            last_name: user.last_name,
            first_name: user.first_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users ordered by id", body = Vec<UserResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(&state.db).list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user; a `user_created` log record is written with it
#[utoipa::path(
    post,
    path = "/api/users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;

    let user = UserRepository::new(&state.db)
        .create_user(
            &state.hasher,
            NewUser {
                last_name: request.last_name,
                first_name: request.first_name,
                email: request.email,
                password: request.password,
                role: request.role,
            },
        )
        .await?;

    tracing::info!(
        created_by = current_user.id,
        user_id = user.id,
        "User created through API"
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
