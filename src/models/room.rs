//! Room entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

/// Room entity; capacity is always positive
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub capacity: i32,

    /// Equipment list as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub equipment: Option<JsonValue>,
}

impl Model {
    /// Equipment names; non-string array items are skipped
    pub fn equipment_list(&self) -> Vec<String> {
        self.equipment
            .as_ref()
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
