//! # Activity Log Repository
//!
//! Append-only audit trail. Appends can join a caller's transaction so the
//! log record commits or rolls back together with the change it describes.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::error::RepositoryError;
use crate::models::activity_log::{self, ActiveModel as LogActiveModel, Model as LogModel};
use crate::models::ActivityLog;

/// Repository for activity log records
pub struct LogRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LogRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append a record through `conn`, typically the caller's open transaction.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        action: &str,
        details: Option<String>,
    ) -> Result<LogModel, RepositoryError> {
        let record = LogActiveModel {
            action: Set(action.to_string()),
            created_at: Set(Utc::now().into()),
            details: Set(details),
            conflict_resolved: Set(false),
            ..Default::default()
        };

        record
            .insert(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All records, newest first.
    pub async fn list_logs(&self) -> Result<Vec<LogModel>, RepositoryError> {
        ActivityLog::find()
            .order_by_desc(activity_log::Column::CreatedAt)
            .order_by_desc(activity_log::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
