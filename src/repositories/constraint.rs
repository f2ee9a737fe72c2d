//! # Constraint Repository
//!
//! Scheduling constraints are stored opaque; only the target kind is checked.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{CONSTRAINT_KIND_MAX_LEN, require_bounded, require_non_blank};
use crate::error::RepositoryError;
use crate::models::scheduling_constraint::{
    self, ActiveModel as ConstraintActiveModel, Model as ConstraintModel,
};
use crate::models::{SchedulingConstraint, TargetKind};

/// Request data for creating a new constraint
#[derive(Debug, Clone)]
pub struct NewConstraint {
    pub kind: String,
    pub value: String,
    /// `teacher`, `group` or `room`
    pub target_kind: String,
    pub target_id: i32,
}

/// Repository for scheduling constraint operations
pub struct ConstraintRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ConstraintRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_constraint(
        &self,
        request: NewConstraint,
    ) -> Result<ConstraintModel, RepositoryError> {
        let kind = require_bounded("kind", &request.kind, CONSTRAINT_KIND_MAX_LEN)?;
        require_non_blank("value", &request.value)?;
        let target_kind = request
            .target_kind
            .trim()
            .parse::<TargetKind>()
            .map_err(RepositoryError::Validation)?;

        ConstraintActiveModel {
            kind: Set(kind),
            value: Set(request.value),
            target_kind: Set(target_kind),
            target_id: Set(request.target_id),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Constraints ordered by id, optionally restricted to one target kind.
    pub async fn list_constraints(
        &self,
        target_kind: Option<TargetKind>,
    ) -> Result<Vec<ConstraintModel>, RepositoryError> {
        let mut query = SchedulingConstraint::find();
        if let Some(kind) = target_kind {
            query = query.filter(scheduling_constraint::Column::TargetKind.eq(kind));
        }

        query
            .order_by_asc(scheduling_constraint::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
