//! # Schedule API Handlers
//!
//! Filtered timetable listing, entry creation and the per-group export.
//! Days travel as `YYYY-MM-DD`, times as `HH:MM`.

use axum::{
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::error::{ApiError, validation_error};
use crate::handlers::types::{format_time, parse_day, parse_time};
use crate::repositories::{
    NewScheduleEntry, ScheduleFilter, ScheduleListing, ScheduleRepository,
};
use crate::server::AppState;

/// Request payload for creating a schedule entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduleEntryRequest {
    pub teacher_id: i32,
    pub group_id: i32,
    pub room_id: i32,
    pub subject_id: i32,
    #[schema(example = "2024-05-10")]
    pub day: String,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,
}

/// Schedule entry with resolved names; unresolved references read `Inconnu`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleEntryResponse {
    pub id: i32,
    #[schema(example = "2024-05-10")]
    pub day: String,
    #[schema(example = "Friday")]
    pub weekday: String,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,
    #[schema(example = "08:00 - 10:00")]
    pub time_range: String,
    pub teacher_id: i32,
    pub group_id: i32,
    pub room_id: i32,
    pub subject_id: i32,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub group: String,
}

impl From<ScheduleListing> for ScheduleEntryResponse {
    fn from(listing: ScheduleListing) -> Self {
        let start_time = format_time(listing.start_time);
        let end_time = format_time(listing.end_time);

        Self {
            id: listing.id,
            day: listing.day.format("%Y-%m-%d").to_string(),
            weekday: listing.day.format("%A").to_string(),
            time_range: format!("{start_time} - {end_time}"),
            start_time,
            end_time,
            teacher_id: listing.teacher_id,
            group_id: listing.group_id,
            room_id: listing.room_id,
            subject_id: listing.subject_id,
            subject: listing.subject_name,
            teacher: listing.teacher_name,
            room: listing.room_name,
            group: listing.group_name,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScheduleQuery {
    pub group_id: Option<i32>,
    pub teacher_id: Option<i32>,
    /// `YYYY-MM-DD`
    pub day: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Group whose timetable is exported
    pub group_id: Option<i32>,
}

/// Ordered timetable of one group
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleExportResponse {
    pub group_id: i32,
    pub group_name: String,
    pub entries: Vec<ScheduleEntryResponse>,
}

/// List schedule entries, optionally filtered by group, teacher and day
#[utoipa::path(
    get,
    path = "/api/schedule",
    security(("bearer_auth" = [])),
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Entries ordered by day, start time and id", body = Vec<ScheduleEntryResponse>),
        (status = 400, description = "Malformed filter", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "schedule"
)]
pub async fn list_schedule(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
) -> Result<Json<Vec<ScheduleEntryResponse>>, ApiError> {
    let Query(query) = query?;

    let day = match query.day.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_day("day", raw)?),
        _ => None,
    };
    let filter = ScheduleFilter {
        group_id: query.group_id,
        teacher_id: query.teacher_id,
        day,
    };

    let entries = ScheduleRepository::new(&state.db)
        .list_entries(filter)
        .await?;
    Ok(Json(
        entries
            .into_iter()
            .map(ScheduleEntryResponse::from)
            .collect(),
    ))
}

/// Create a schedule entry
#[utoipa::path(
    post,
    path = "/api/schedule",
    security(("bearer_auth" = [])),
    request_body = CreateScheduleEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = ScheduleEntryResponse),
        (status = 400, description = "Malformed day or time, end not after start, or unknown reference", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
    ),
    tag = "schedule"
)]
pub async fn create_schedule_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    payload: Result<Json<CreateScheduleEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScheduleEntryResponse>), ApiError> {
    let Json(request) = payload?;

    let new_entry = NewScheduleEntry {
        teacher_id: request.teacher_id,
        group_id: request.group_id,
        room_id: request.room_id,
        subject_id: request.subject_id,
        day: parse_day("day", &request.day)?,
        start_time: parse_time("start_time", &request.start_time)?,
        end_time: parse_time("end_time", &request.end_time)?,
    };

    let repository = ScheduleRepository::new(&state.db);
    let entry = repository.create_entry(new_entry).await?;
    let listing = repository.find_listing(entry.id).await?.ok_or_else(|| {
        ApiError::from(anyhow::anyhow!("schedule entry {} vanished after insert", entry.id))
    })?;

    Ok((StatusCode::CREATED, Json(ScheduleEntryResponse::from(listing))))
}

/// Export the ordered timetable of one group
#[utoipa::path(
    get,
    path = "/api/export/schedule",
    security(("bearer_auth" = [])),
    params(ExportQuery),
    responses(
        (status = 200, description = "Group timetable ordered by day and start time", body = ScheduleExportResponse),
        (status = 400, description = "Missing group_id", body = ApiError),
        (status = 401, description = "Token manquant or Token invalide", body = ApiError),
        (status = 404, description = "Unknown group", body = ApiError),
    ),
    tag = "schedule"
)]
pub async fn export_schedule(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Json<ScheduleExportResponse>, ApiError> {
    let Query(query) = query?;
    let group_id = query.group_id.ok_or_else(|| {
        validation_error(
            "Missing query parameter",
            serde_json::json!({ "group_id": "required" }),
        )
    })?;

    let export = ScheduleRepository::new(&state.db)
        .list_for_export(group_id)
        .await?;

    Ok(Json(ScheduleExportResponse {
        group_id: export.group.id,
        group_name: export.group.name,
        entries: export
            .entries
            .into_iter()
            .map(ScheduleEntryResponse::from)
            .collect(),
    }))
}
