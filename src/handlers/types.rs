//! # Common API Types
//!
//! Request shapes and parsing helpers shared by several handlers.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, validation_error};

/// Request payload for linking a subject to a teacher or a group
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkSubjectRequest {
    #[schema(example = 4)]
    pub subject_id: i32,
}

/// Parse a calendar day written `YYYY-MM-DD`.
pub fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        validation_error(
            "Invalid date",
            serde_json::json!({ field: format!("expected YYYY-MM-DD, got '{raw}'") }),
        )
    })
}

/// Parse a time of day written `HH:MM` or `HH:MM:SS`.
pub fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, ApiError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            validation_error(
                "Invalid time",
                serde_json::json!({ field: format!("expected HH:MM or HH:MM:SS, got '{raw}'") }),
            )
        })
}

/// `HH:MM`, the display form used in every response
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parses_days_and_times() {
        assert_eq!(
            parse_day("day", "2024-05-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
        assert_eq!(
            parse_time("start_time", "08:00").unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("start_time", "13:30:15").unwrap(),
            NaiveTime::from_hms_opt(13, 30, 15).unwrap()
        );
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "09:05");
    }

    #[test]
    fn rejects_malformed_values_with_field_details() {
        let err = parse_day("day", "10/05/2024").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.details.unwrap().get("day").is_some());

        assert!(parse_time("end_time", "25:00").is_err());
        assert!(parse_time("end_time", "8h").is_err());
    }
}
