//! # Subject Repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::{SUBJECT_NAME_MAX_LEN, ensure_not_scheduled, require_bounded, require_positive};
use crate::error::RepositoryError;
use crate::models::subject::{self, ActiveModel as SubjectActiveModel, Model as SubjectModel};
use crate::models::{
    GroupSubject, Subject, TeacherSubject, group_subject, schedule_entry, teacher_subject,
};

/// Request data for creating a new subject
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub duration_hours: i32,
}

/// Repository for Subject database operations
pub struct SubjectRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubjectRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_subject(
        &self,
        request: NewSubject,
    ) -> Result<SubjectModel, RepositoryError> {
        let name = require_bounded("name", &request.name, SUBJECT_NAME_MAX_LEN)?;
        require_positive("duration_hours", request.duration_hours)?;

        SubjectActiveModel {
            name: Set(name),
            duration_hours: Set(request.duration_hours),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn list_subjects(&self) -> Result<Vec<SubjectModel>, RepositoryError> {
        Subject::find()
            .order_by_asc(subject::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a subject no schedule entry references.
    ///
    /// Teacher and group links to the subject go with it.
    pub async fn delete_subject(&self, id: i32) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Subject::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("subject {id}")))?;

        ensure_not_scheduled(
            &txn,
            schedule_entry::Column::SubjectId.eq(id),
            &format!("subject {id}"),
        )
        .await?;

        TeacherSubject::delete_many()
            .filter(teacher_subject::Column::SubjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        GroupSubject::delete_many()
            .filter(group_subject::Column::SubjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        Subject::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(subject_id = id, "Subject deleted");
        Ok(())
    }
}
