//! # Room Repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::Value;

use super::{NAME_MAX_LEN, ensure_not_scheduled, require_bounded, require_non_blank, require_positive};
use crate::error::RepositoryError;
use crate::models::room::{self, ActiveModel as RoomActiveModel, Model as RoomModel};
use crate::models::{Room, schedule_entry};

/// Request data for creating a new room
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub capacity: i32,
    pub equipment: Option<Vec<String>>,
}

/// Repository for Room database operations
pub struct RoomRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoomRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_room(&self, request: NewRoom) -> Result<RoomModel, RepositoryError> {
        let name = require_bounded("name", &request.name, NAME_MAX_LEN)?;
        require_positive("capacity", request.capacity)?;

        let equipment = match request.equipment {
            Some(items) => {
                let mut cleaned = Vec::with_capacity(items.len());
                for item in items {
                    cleaned.push(Value::String(require_non_blank("equipment item", &item)?));
                }
                Some(Value::Array(cleaned))
            }
            None => None,
        };

        RoomActiveModel {
            name: Set(name),
            capacity: Set(request.capacity),
            equipment: Set(equipment),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomModel>, RepositoryError> {
        Room::find()
            .order_by_asc(room::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a room no schedule entry references.
    pub async fn delete_room(&self, id: i32) -> Result<(), RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        Room::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found(format!("room {id}")))?;

        ensure_not_scheduled(
            &txn,
            schedule_entry::Column::RoomId.eq(id),
            &format!("room {id}"),
        )
        .await?;

        Room::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(room_id = id, "Room deleted");
        Ok(())
    }
}
