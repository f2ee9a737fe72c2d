//! # Subjects API Handlers

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
use crate::models::subject::Model as SubjectModel;
use crate::repositories::{NewSubject, SubjectRepository};
use crate::server::AppState;

/// Request payload for creating a subject
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Algèbre")]
    pub name: String,
    /// Hours, strictly positive
    #[schema(example = 2)]
    pub duration_hours: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub name: String,
    pub duration_hours: i32,
}

impl From<SubjectModel> for SubjectResponse {
    fn from(subject: SubjectModel) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            duration_hours: subject.duration_hours,
        }
    }
}

/// List subjects
#[utoipa::path(
    get,
    path = "/api/subjects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subjects ordered by id", body = Vec<SubjectResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "subjects"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let subjects = SubjectRepository::new(&state.db).list_subjects().await?;
    Ok(Json(subjects.into_iter().map(SubjectResponse::from).collect()))
}

/// Create a subject
#[utoipa::path(
    post,
    path = "/api/subjects",
    security(("bearer_auth" = [])),
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "subjects"
)]
pub async fn create_subject(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateSubjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    let Json(request) = payload?;

    let subject = SubjectRepository::new(&state.db)
        .create_subject(NewSubject {
            name: request.name,
            duration_hours: request.duration_hours,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from(subject))))
}

/// Delete a subject not referenced by any schedule entry
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Subject id")),
    responses(
        (status = 204, description = "Subject and its teacher/group links deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown subject", body = ApiError),
        (status = 409, description = "Subject still scheduled", body = ApiError),
    ),
    tag = "subjects"
)]
pub async fn delete_subject(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    SubjectRepository::new(&state.db).delete_subject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
