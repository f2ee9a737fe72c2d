//! # Schedule Repository
//!
//! Timetable entries. Listings resolve subject, teacher, room and group names
//! with explicit left joins; a reference that no longer resolves is reported
//! as [`UNKNOWN_NAME`] rather than failing the listing.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::UNKNOWN_NAME;
use crate::error::RepositoryError;
use crate::models::group::Model as GroupModel;
use crate::models::schedule_entry::{
    self, ActiveModel as ScheduleEntryActiveModel, Model as ScheduleEntryModel,
};
use crate::models::{Group, Room, ScheduleEntry, Subject, Teacher, group, room, subject, teacher};

/// Request data for creating a schedule entry
#[derive(Debug, Clone)]
pub struct NewScheduleEntry {
    pub teacher_id: i32,
    pub group_id: i32,
    pub room_id: i32,
    pub subject_id: i32,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Optional listing filters, combined with AND
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub group_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub day: Option<NaiveDate>,
}

/// A schedule entry with its references resolved to display names
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleListing {
    pub id: i32,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub teacher_id: i32,
    pub group_id: i32,
    pub room_id: i32,
    pub subject_id: i32,
    pub subject_name: String,
    pub teacher_name: String,
    pub room_name: String,
    pub group_name: String,
}

/// Ordered timetable of one group
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleExport {
    pub group: GroupModel,
    pub entries: Vec<ScheduleListing>,
}

#[derive(Debug, FromQueryResult)]
struct ListingRow {
    id: i32,
    day: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    teacher_id: i32,
    group_id: i32,
    room_id: i32,
    subject_id: i32,
    subject_name: Option<String>,
    teacher_last_name: Option<String>,
    teacher_first_name: Option<String>,
    room_name: Option<String>,
    group_name: Option<String>,
}

impl From<ListingRow> for ScheduleListing {
    fn from(row: ListingRow) -> Self {
        let teacher_name = match (row.teacher_last_name, row.teacher_first_name) {
            (Some(last), Some(first)) => format!("{last} {first}"),
            _ => UNKNOWN_NAME.to_string(),
        };
        let or_unknown = |name: Option<String>| name.unwrap_or_else(|| UNKNOWN_NAME.to_string());

        Self {
            id: row.id,
            day: row.day,
            start_time: row.start_time,
            end_time: row.end_time,
            teacher_id: row.teacher_id,
            group_id: row.group_id,
            room_id: row.room_id,
            subject_id: row.subject_id,
            subject_name: or_unknown(row.subject_name),
            teacher_name,
            room_name: or_unknown(row.room_name),
            group_name: or_unknown(row.group_name),
        }
    }
}

/// Repository for schedule entry operations
pub struct ScheduleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an entry after checking its time range and every reference.
    pub async fn create_entry(
        &self,
        request: NewScheduleEntry,
    ) -> Result<ScheduleEntryModel, RepositoryError> {
        if request.end_time <= request.start_time {
            return Err(RepositoryError::validation_error(format!(
                "end_time ({}) must be later than start_time ({})",
                request.end_time, request.start_time
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let missing = |what: &str, id: i32| {
            RepositoryError::validation_error(format!("{what} {id} does not exist"))
        };

        if Teacher::find_by_id(request.teacher_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .is_none()
        {
            return Err(missing("teacher", request.teacher_id));
        }
        if Group::find_by_id(request.group_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .is_none()
        {
            return Err(missing("group", request.group_id));
        }
        if Room::find_by_id(request.room_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .is_none()
        {
            return Err(missing("room", request.room_id));
        }
        if Subject::find_by_id(request.subject_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .is_none()
        {
            return Err(missing("subject", request.subject_id));
        }

        let created = ScheduleEntryActiveModel {
            teacher_id: Set(request.teacher_id),
            group_id: Set(request.group_id),
            room_id: Set(request.room_id),
            subject_id: Set(request.subject_id),
            day: Set(request.day),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::debug!(
            entry_id = created.id,
            group_id = created.group_id,
            day = %created.day,
            "Schedule entry created"
        );
        Ok(created)
    }

    /// Entries matching `filter`, ordered by day, start time, then id.
    pub async fn list_entries(
        &self,
        filter: ScheduleFilter,
    ) -> Result<Vec<ScheduleListing>, RepositoryError> {
        let mut condition = Condition::all();
        if let Some(group_id) = filter.group_id {
            condition = condition.add(schedule_entry::Column::GroupId.eq(group_id));
        }
        if let Some(teacher_id) = filter.teacher_id {
            condition = condition.add(schedule_entry::Column::TeacherId.eq(teacher_id));
        }
        if let Some(day) = filter.day {
            condition = condition.add(schedule_entry::Column::Day.eq(day));
        }

        self.select_listings(condition).await
    }

    /// A single entry with its names resolved.
    pub async fn find_listing(&self, id: i32) -> Result<Option<ScheduleListing>, RepositoryError> {
        let mut listings = self
            .select_listings(Condition::all().add(schedule_entry::Column::Id.eq(id)))
            .await?;
        Ok(listings.pop())
    }

    async fn select_listings(
        &self,
        condition: Condition,
    ) -> Result<Vec<ScheduleListing>, RepositoryError> {
        let rows = ScheduleEntry::find()
            .select_only()
            .columns([
                schedule_entry::Column::Id,
                schedule_entry::Column::Day,
                schedule_entry::Column::StartTime,
                schedule_entry::Column::EndTime,
                schedule_entry::Column::TeacherId,
                schedule_entry::Column::GroupId,
                schedule_entry::Column::RoomId,
                schedule_entry::Column::SubjectId,
            ])
            .column_as(subject::Column::Name, "subject_name")
            .column_as(teacher::Column::LastName, "teacher_last_name")
            .column_as(teacher::Column::FirstName, "teacher_first_name")
            .column_as(room::Column::Name, "room_name")
            .column_as(group::Column::Name, "group_name")
            .join(JoinType::LeftJoin, schedule_entry::Relation::Subject.def())
            .join(JoinType::LeftJoin, schedule_entry::Relation::Teacher.def())
            .join(JoinType::LeftJoin, schedule_entry::Relation::Room.def())
            .join(JoinType::LeftJoin, schedule_entry::Relation::Group.def())
            .filter(condition)
            .order_by_asc(schedule_entry::Column::Day)
            .order_by_asc(schedule_entry::Column::StartTime)
            .order_by_asc(schedule_entry::Column::Id)
            .into_model::<ListingRow>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().map(ScheduleListing::from).collect())
    }

    /// Ordered timetable of one group, for export.
    pub async fn list_for_export(&self, group_id: i32) -> Result<ScheduleExport, RepositoryError> {
        let group = Group::find_by_id(group_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("group {group_id}")))?;

        let entries = self
            .list_entries(ScheduleFilter {
                group_id: Some(group_id),
                ..Default::default()
            })
            .await?;

        Ok(ScheduleExport { group, entries })
    }
}
