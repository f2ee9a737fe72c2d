//! # Constraints API Handlers

use axum::{
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::error::{ApiError, validation_error};
use crate::models::TargetKind;
use crate::models::scheduling_constraint::Model as ConstraintModel;
use crate::repositories::{ConstraintRepository, NewConstraint};
use crate::server::AppState;

/// Request payload for creating a constraint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateConstraintRequest {
    /// Constraint type, e.g. `indisponibilite`
    #[schema(example = "indisponibilite")]
    pub kind: String,
    /// Opaque value interpreted by whoever consumes the constraint
    #[schema(example = "lundi matin")]
    pub value: String,
    /// `teacher`, `group` or `room`
    #[schema(example = "teacher")]
    pub target_kind: String,
    #[schema(example = 3)]
    pub target_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConstraintResponse {
    pub id: i32,
    pub kind: String,
    pub value: String,
    pub target_kind: TargetKind,
    pub target_id: i32,
}

impl From<ConstraintModel> for ConstraintResponse {
    fn from(constraint: ConstraintModel) -> Self {
        Self {
            id: constraint.id,
            kind: constraint.kind,
            value: constraint.value,
            target_kind: constraint.target_kind,
            target_id: constraint.target_id,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListConstraintsQuery {
    /// Restrict to `teacher`, `group` or `room`
    pub target_kind: Option<String>,
}

/// List constraints
#[utoipa::path(
    get,
    path = "/api/constraints",
    security(("bearer_auth" = [])),
    params(ListConstraintsQuery),
    responses(
        (status = 200, description = "Constraints ordered by id", body = Vec<ConstraintResponse>),
        (status = 400, description = "Unknown target kind", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "constraints"
)]
pub async fn list_constraints(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    query: Result<Query<ListConstraintsQuery>, QueryRejection>,
) -> Result<Json<Vec<ConstraintResponse>>, ApiError> {
    let Query(query) = query?;

    let target_kind = query
        .target_kind
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<TargetKind>().map_err(|reason| {
                validation_error(
                    "Invalid query parameter",
                    serde_json::json!({ "target_kind": reason }),
                )
            })
        })
        .transpose()?;

    let constraints = ConstraintRepository::new(&state.db)
        .list_constraints(target_kind)
        .await?;
    Ok(Json(
        constraints
            .into_iter()
            .map(ConstraintResponse::from)
            .collect(),
    ))
}

/// Create a constraint
#[utoipa::path(
    post,
    path = "/api/constraints",
    security(("bearer_auth" = [])),
    request_body = CreateConstraintRequest,
    responses(
        (status = 201, description = "Constraint created", body = ConstraintResponse),
        (status = 400, description = "Blank field or unknown target kind", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "constraints"
)]
pub async fn create_constraint(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateConstraintRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConstraintResponse>), ApiError> {
    let Json(request) = payload?;

    let constraint = ConstraintRepository::new(&state.db)
        .create_constraint(NewConstraint {
            kind: request.kind,
            value: request.value,
            target_kind: request.target_kind,
            target_id: request.target_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ConstraintResponse::from(constraint))))
}
