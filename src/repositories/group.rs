//! # Group Repository
//!
//! Student groups and the subjects they follow.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::{NAME_MAX_LEN, ensure_not_scheduled, group_names, require_bounded, require_positive};
use crate::error::RepositoryError;
use crate::models::group::{self, ActiveModel as GroupActiveModel, Model as GroupModel};
use crate::models::{Group, GroupSubject, Subject, group_subject, schedule_entry, subject};

/// Request data for creating a new group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub student_count: i32,
}

/// A group with the names of the subjects it follows
#[derive(Debug, Clone, PartialEq)]
pub struct GroupWithSubjects {
    pub group: GroupModel,
    pub subjects: Vec<String>,
}

#[derive(Debug, FromQueryResult)]
struct SubjectLinkRow {
    owner_id: i32,
    subject_name: String,
}

/// Repository for Group database operations
pub struct GroupRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GroupRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_group(&self, request: NewGroup) -> Result<GroupModel, RepositoryError> {
        let name = require_bounded("name", &request.name, NAME_MAX_LEN)?;
        require_positive("student_count", request.student_count)?;

        GroupActiveModel {
            name: Set(name),
            student_count: Set(request.student_count),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn find_group(&self, id: i32) -> Result<Option<GroupModel>, RepositoryError> {
        Group::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All groups ordered by id, each with its subject names.
    pub async fn list_groups(&self) -> Result<Vec<GroupWithSubjects>, RepositoryError> {
        let groups = Group::find()
            .order_by_asc(group::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let links = GroupSubject::find()
            .select_only()
            .column_as(group_subject::Column::GroupId, "owner_id")
            .column_as(subject::Column::Name, "subject_name")
            .join(JoinType::InnerJoin, group_subject::Relation::Subject.def())
            .order_by_asc(subject::Column::Name)
            .into_model::<SubjectLinkRow>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut subjects =
            group_names(links.into_iter().map(|row| (row.owner_id, row.subject_name)));

        Ok(groups
            .into_iter()
            .map(|group| GroupWithSubjects {
                subjects: subjects.remove(&group.id).unwrap_or_default(),
                group,
            })
            .collect())
    }

    /// Link a subject to a group. Linking an existing pair is a no-op.
    pub async fn assign_subject(
        &self,
        group_id: i32,
        subject_id: i32,
    ) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Group::find_by_id(group_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("group {group_id}")))?;
        Subject::find_by_id(subject_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("subject {subject_id}")))?;

        let linked = GroupSubject::find_by_id((group_id, subject_id))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        if linked.is_none() {
            GroupSubject::insert(group_subject::ActiveModel {
                group_id: Set(group_id),
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

    /// Delete a group no schedule entry references, with its subject links.
    pub async fn delete_group(&self, id: i32) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Group::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("group {id}")))?;

        ensure_not_scheduled(
            &txn,
            schedule_entry::Column::GroupId.eq(id),
            &format!("group {id}"),
        )
        .await?;

        GroupSubject::delete_many()
            .filter(group_subject::Column::GroupId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        Group::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(group_id = id, "Group deleted");
        Ok(())
    }
}
