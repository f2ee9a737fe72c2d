//! # Teacher Repository
//!
//! Teachers, their subject links and restrict-on-delete removal.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde_json::Value;

use super::{NAME_MAX_LEN, ensure_not_scheduled, group_names, require_bounded, require_email};
use crate::error::RepositoryError;
use crate::models::teacher::{ActiveModel as TeacherActiveModel, Model as TeacherModel};
use crate::models::{
    Subject, Teacher, TeacherSubject, schedule_entry, subject, teacher, teacher_subject,
};

/// Request data for creating a new teacher
#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    /// JSON object, stored as given
    pub availability: Option<Value>,
    /// JSON object, stored as given
    pub preferences: Option<Value>,
}

/// A teacher with the names of the subjects they teach
#[derive(Debug, Clone, PartialEq)]
pub struct TeacherWithSubjects {
    pub teacher: TeacherModel,
    pub subjects: Vec<String>,
}

#[derive(Debug, FromQueryResult)]
struct SubjectLinkRow {
    owner_id: i32,
    subject_name: String,
}

/// Repository for Teacher database operations
pub struct TeacherRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeacherRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_teacher(
        &self,
        request: NewTeacher,
    ) -> Result<TeacherModel, RepositoryError> {
        let last_name = require_bounded("last_name", &request.last_name, NAME_MAX_LEN)?;
        let first_name = require_bounded("first_name", &request.first_name, NAME_MAX_LEN)?;
        let email = require_email(&request.email)?;
        let availability = json_object("availability", request.availability)?;
        let preferences = json_object("preferences", request.preferences)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let existing = Teacher::find()
            .filter(teacher::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(format!(
                "a teacher with email '{email}' already exists"
            )));
        }

        let created = TeacherActiveModel {
            last_name: Set(last_name),
            first_name: Set(first_name),
            email: Set(email),
            availability: Set(availability),
            preferences: Set(preferences),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(created)
    }

    /// All teachers ordered by id, each with its subject names.
    pub async fn list_teachers(&self) -> Result<Vec<TeacherWithSubjects>, RepositoryError> {
        let teachers = Teacher::find()
            .order_by_asc(teacher::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let links = TeacherSubject::find()
            .select_only()
            .column_as(teacher_subject::Column::TeacherId, "owner_id")
            .column_as(subject::Column::Name, "subject_name")
            .join(JoinType::InnerJoin, teacher_subject::Relation::Subject.def())
            .order_by_asc(subject::Column::Name)
            .into_model::<SubjectLinkRow>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut subjects =
            group_names(links.into_iter().map(|row| (row.owner_id, row.subject_name)));

        Ok(teachers
            .into_iter()
            .map(|teacher| TeacherWithSubjects {
                subjects: subjects.remove(&teacher.id).unwrap_or_default(),
                teacher,
            })
            .collect())
    }

    pub async fn find_teacher(&self, id: i32) -> Result<Option<TeacherModel>, RepositoryError> {
        Teacher::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Link a subject to a teacher. Linking an existing pair is a no-op.
    pub async fn assign_subject(
        &self,
        teacher_id: i32,
        subject_id: i32,
    ) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Teacher::find_by_id(teacher_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("teacher {teacher_id}")))?;
        Subject::find_by_id(subject_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("subject {subject_id}")))?;

        let linked = TeacherSubject::find_by_id((teacher_id, subject_id))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        if linked.is_none() {
            TeacherSubject::insert(teacher_subject::ActiveModel {
                teacher_id: Set(teacher_id),
                subject_id: Set(subject_id),
            })
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        }

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(())
    }

    /// Delete a teacher that no schedule entry references, with its subject links.
    pub async fn delete_teacher(&self, id: i32) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Teacher::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("teacher {id}")))?;

        ensure_not_scheduled(
            &txn,
            schedule_entry::Column::TeacherId.eq(id),
            &format!("teacher {id}"),
        )
        .await?;

        TeacherSubject::delete_many()
            .filter(teacher_subject::Column::TeacherId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        Teacher::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(teacher_id = id, "Teacher deleted");
        Ok(())
    }
}

/// Accept a JSON object or nothing; `null` counts as nothing.
fn json_object(field: &str, value: Option<Value>) -> Result<Option<Value>, RepositoryError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(object @ Value::Object(_)) => Ok(Some(object)),
        Some(_) => Err(RepositoryError::validation_error(format!(
            "{field} must be a JSON object"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_accepts_objects_and_null_only() {
        assert_eq!(json_object("availability", None).unwrap(), None);
        assert_eq!(json_object("availability", Some(Value::Null)).unwrap(), None);
        assert_eq!(
            json_object("availability", Some(json!({"lundi": ["08:00-12:00"]}))).unwrap(),
            Some(json!({"lundi": ["08:00-12:00"]}))
        );
        assert!(json_object("availability", Some(json!(["lundi"]))).is_err());
        assert!(json_object("preferences", Some(json!("matin"))).is_err());
    }
}
