//! # Teachers API Handlers

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
use crate::models::teacher::Model as TeacherModel;
use crate::repositories::{NewTeacher, TeacherRepository, TeacherWithSubjects};
use crate::server::AppState;

/// Request payload for creating a teacher
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTeacherRequest {
    #[schema(example = "Rakoto")]
    pub last_name: String,
    #[schema(example = "Jean")]
    pub first_name: String,
    #[schema(example = "jean.rakoto@univ.mg")]
    pub email: String,
    /// Free-form availability map
    #[schema(value_type = Option<Object>)]
    pub availability: Option<serde_json::Value>,
    /// Free-form preference map
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

/// Teacher with the subjects they teach
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeacherResponse {
    pub id: i32,
    /// `"<last> <first>"`
    #[schema(example = "Rakoto Jean")]
    pub name: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    /// Subject names, alphabetical
    pub subjects: Vec<String>,
    /// Returned exactly as stored
    #[schema(value_type = Option<Object>)]
    pub availability: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

impl TeacherResponse {
    fn new(teacher: TeacherModel, subjects: Vec<String>) -> Self {
        Self {
            id: teacher.id,
            name: teacher.full_name(),
            last_name: teacher.last_name,
            first_name: teacher.first_name,
            email: teacher.email,
            subjects,
            availability: teacher.availability,
            preferences: teacher.preferences,
        }
    }
}

impl From<TeacherWithSubjects> for TeacherResponse {
    fn from(row: TeacherWithSubjects) -> Self {
        Self::new(row.teacher, row.subjects)
    }
}

/// List teachers with their subjects and availability
#[utoipa::path(
    get,
    path = "/api/teachers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teachers ordered by id", body = Vec<TeacherResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<TeacherResponse>>, ApiError> {
    let teachers = TeacherRepository::new(&state.db).list_teachers().await?;
    Ok(Json(teachers.into_iter().map(TeacherResponse::from).collect()))
}

/// Create a teacher
#[utoipa::path(
    post,
    path = "/api/teachers",
    security(("bearer_auth" = [])),
    request_body = CreateTeacherRequest,
    responses(
        (status = 201, description = "Teacher created", body = TeacherResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 409, description = "Email already used by another teacher", body = ApiError),
    ),
    tag = "teachers"
)]
pub async fn create_teacher(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateTeacherRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeacherResponse>), ApiError> {
    let Json(request) = payload?;

    let teacher = TeacherRepository::new(&state.db)
        .create_teacher(NewTeacher {
            last_name: request.last_name,
            first_name: request.first_name,
            email: request.email,
            availability: request.availability,
            preferences: request.preferences,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TeacherResponse::new(teacher, Vec::new())),
    ))
}

/// Delete a teacher not referenced by any schedule entry
#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Teacher id")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown teacher", body = ApiError),
        (status = 409, description = "Teacher still scheduled", body = ApiError),
    ),
    tag = "teachers"
)]
pub async fn delete_teacher(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    TeacherRepository::new(&state.db).delete_teacher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link a subject to a teacher
#[utoipa::path(
    post,
    path = "/api/teachers/{id}/subjects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Teacher id")),
    request_body = LinkSubjectRequest,
    responses(
        (status = 204, description = "Subject linked"),
        (status = 400, description = "Malformed id or body", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown teacher or subject", body = ApiError),
    ),
    tag = "teachers"
)]
pub async fn assign_subject(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<LinkSubjectRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    TeacherRepository::new(&state.db)
        .assign_subject(id, request.subject_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
