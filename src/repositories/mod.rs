//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for the
//! timetable entities. Every write that touches more than one row runs in a
//! single transaction; invariants are checked here before anything is written.

use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, sea_query::SimpleExpr};

use crate::error::RepositoryError;
use crate::models::ScheduleEntry;

pub mod activity_log;
pub mod constraint;
pub mod group;
pub mod room;
pub mod schedule;
pub mod subject;
pub mod teacher;
pub mod user;

pub use activity_log::LogRepository;
pub use constraint::{ConstraintRepository, NewConstraint};
pub use group::{GroupRepository, GroupWithSubjects, NewGroup};
pub use room::{NewRoom, RoomRepository};
pub use schedule::{
    NewScheduleEntry, ScheduleExport, ScheduleFilter, ScheduleListing, ScheduleRepository,
};
pub use subject::{NewSubject, SubjectRepository};
pub use teacher::{NewTeacher, TeacherRepository, TeacherWithSubjects};
pub use user::{NewUser, UserRepository};

/// Placeholder for a name that no longer resolves.
pub const UNKNOWN_NAME: &str = "Inconnu";

// Column widths declared by the migrations.
pub(crate) const NAME_MAX_LEN: usize = 50;
pub(crate) const SUBJECT_NAME_MAX_LEN: usize = 100;
pub(crate) const EMAIL_MAX_LEN: usize = 100;
pub(crate) const CONSTRAINT_KIND_MAX_LEN: usize = 50;

/// Trimmed `value`, or a validation error naming `field` when blank.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<String, RepositoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::validation_error(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// [`require_non_blank`] capped at `max` characters, the width of the backing column.
pub(crate) fn require_bounded(
    field: &str,
    value: &str,
    max: usize,
) -> Result<String, RepositoryError> {
    let trimmed = require_non_blank(field, value)?;
    require_max_len(field, &trimmed, max)?;
    Ok(trimmed)
}

fn require_max_len(field: &str, value: &str, max: usize) -> Result<(), RepositoryError> {
    let len = value.chars().count();
    if len > max {
        return Err(RepositoryError::validation_error(format!(
            "{field} must be at most {max} characters, got {len}"
        )));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: i32) -> Result<(), RepositoryError> {
    if value <= 0 {
        return Err(RepositoryError::validation_error(format!(
            "{field} must be greater than 0, got {value}"
        )));
    }
    Ok(())
}

/// Loose address check: one `@` with a non-empty local part and a dotted domain.
pub(crate) fn require_email(value: &str) -> Result<String, RepositoryError> {
    let email = require_bounded("email", value, EMAIL_MAX_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(RepositoryError::validation_error(format!(
            "email '{email}' is not a valid address"
        )));
    }
    Ok(email)
}

/// Refuse to delete a row still referenced by schedule entries.
pub(crate) async fn ensure_not_scheduled<C: ConnectionTrait>(
    conn: &C,
    reference: SimpleExpr,
    what: &str,
) -> Result<(), RepositoryError> {
    let entries = ScheduleEntry::find()
        .filter(reference)
        .count(conn)
        .await
        .map_err(RepositoryError::database_error)?;

    if entries > 0 {
        return Err(RepositoryError::conflict(format!(
            "{what} is referenced by {entries} schedule entr{}",
            if entries == 1 { "y" } else { "ies" }
        )));
    }
    Ok(())
}

/// Group `(owner_id, name)` pairs into one name list per owner.
pub(crate) fn group_names(
    rows: impl IntoIterator<Item = (i32, String)>,
) -> BTreeMap<i32, Vec<String>> {
    let mut grouped: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    for (owner_id, name) in rows {
        grouped.entry(owner_id).or_default().push(name);
    }
    grouped
}
