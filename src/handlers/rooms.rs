//! # Rooms API Handlers

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
use crate::models::room::Model as RoomModel;
use crate::repositories::{NewRoom, RoomRepository};
use crate::server::AppState;

/// Request payload for creating a room
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    #[schema(example = "B12")]
    pub name: String,
    /// Seats, strictly positive
    #[schema(example = 40)]
    pub capacity: i32,
    #[schema(example = json!(["projecteur", "tableau blanc"]))]
    pub equipment: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub equipment: Vec<String>,
}

impl From<RoomModel> for RoomResponse {
    fn from(room: RoomModel) -> Self {
        Self {
            equipment: room.equipment_list(),
            id: room.id,
            name: room.name,
            capacity: room.capacity,
        }
    }
}

/// List rooms
#[utoipa::path(
    get,
    path = "/api/rooms",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rooms ordered by id", body = Vec<RoomResponse>),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let rooms = RoomRepository::new(&state.db).list_rooms().await?;
    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Create a room
#[utoipa::path(
    post,
    path = "/api/rooms",
    security(("bearer_auth" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "rooms"
)]
pub async fn create_room(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    let Json(request) = payload?;

    let room = RoomRepository::new(&state.db)
        .create_room(NewRoom {
            name: request.name,
            capacity: request.capacity,
            equipment: request.equipment,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

/// Delete a room not referenced by any schedule entry
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown room", body = ApiError),
        (status = 409, description = "Room still scheduled", body = ApiError),
    ),
    tag = "rooms"
)]
pub async fn delete_room(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    RoomRepository::new(&state.db).delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
