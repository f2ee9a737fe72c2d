//! # Groups API Handlers

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::types::LinkSubjectRequest;
use crate::repositories::{GroupRepository, GroupWithSubjects, NewGroup};
use crate::server::AppState;

/// Request payload for creating a group
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    #[schema(example = "L1 Informatique")]
    pub name: String,
    /// Strictly positive
    #[schema(example = 35)]
    pub student_count: i32,
}

/// Group with the subjects it follows
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: i32,
    pub name: String,
    pub student_count: i32,
    pub subjects: Vec<String>,
}

impl From<GroupWithSubjects> for GroupResponse {
    fn from(row: GroupWithSubjects) -> Self {
        Self {
            id: row.group.id,
            name: row.group.name,
            student_count: row.group.student_count,
            subjects: row.subjects,
        }
    }
}

/// List groups with their subjects
#[utoipa::path(
    get,
    path = "/api/groups",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Groups ordered by id", body = Vec<GroupResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "groups"
)]
pub async fn list_groups(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = GroupRepository::new(&state.db).list_groups().await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

/// Create a group
#[utoipa::path(
    post,
    path = "/api/groups",
    security(("bearer_auth" = [])),
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let Json(request) = payload?;

    let group = GroupRepository::new(&state.db)
        .create_group(NewGroup {
            name: request.name,
            student_count: request.student_count,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupResponse::from(GroupWithSubjects {
            group,
            subjects: Vec::new(),
        })),
    ))
}

/// Delete a group not referenced by any schedule entry
#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown group", body = ApiError),
        (status = 409, description = "Group still scheduled", body = ApiError),
    ),
    tag = "groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    GroupRepository::new(&state.db).delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link a subject to a group
#[utoipa::path(
    post,
    path = "/api/groups/{id}/subjects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Group id")),
    request_body = LinkSubjectRequest,
    responses(
        (status = 204, description = "Subject linked"),
        (status = 400, description = "Malformed id or body", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown group or subject", body = ApiError),
    ),
    tag = "groups"
)]
pub async fn assign_subject(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<LinkSubjectRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    GroupRepository::new(&state.db)
        .assign_subject(id, request.subject_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
