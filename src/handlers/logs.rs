//! # Activity Log API Handlers

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::repositories::LogRepository;
use crate::server::AppState;

/// One activity log record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogResponse {
    pub id: i32,
    #[schema(example = "2024-05-10 08:15:00")]
    pub date: String,
    /// Name of the user reading the log
    #[schema(example = "Rakoto Jean")]
    pub user: String,
    #[schema(example = "user_created")]
    pub action: String,
    pub details: Option<String>,
    pub conflict_resolved: bool,
}

/// List the activity log, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Log records, newest first", body = Vec<LogResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "logs"
)]
pub async fn list_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<LogResponse>>, ApiError> {
    let logs = LogRepository::new(&state.db).list_logs().await?;
    let user = current_user.full_name();

    Ok(Json(
        logs.into_iter()
            .map(|log| LogResponse {
                id: log.id,
                date: log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                user: user.clone(),
                action: log.action,
                details: log.details,
                conflict_resolved: log.conflict_resolved,
            })
            .collect(),
    ))
}
