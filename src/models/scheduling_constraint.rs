//! Scheduling constraint entity model
//!
//! A constraint is an opaque rule (`kind` + free-text `value`) attached to a
//! teacher, a group or a room. Nothing in the service interprets it.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduling_constraints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Constraint type, e.g. `unavailable`, `max_hours_per_day`
    pub kind: String,

    /// Opaque constraint payload
    #[sea_orm(column_type = "Text")]
    pub value: String,

    pub target_kind: TargetKind,

    pub target_id: i32,
}

/// Kind of entity a constraint applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TargetKind {
    #[sea_orm(string_value = "teacher")]
    #[serde(rename = "teacher")]
    Teacher,

    #[sea_orm(string_value = "group")]
    #[serde(rename = "group")]
    Group,

    #[sea_orm(string_value = "room")]
    #[serde(rename = "room")]
    Room,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Teacher => "teacher",
            TargetKind::Group => "group",
            TargetKind::Room => "room",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "teacher" => Ok(TargetKind::Teacher),
            "group" => Ok(TargetKind::Group),
            "room" => Ok(TargetKind::Room),
            other => Err(format!(
                "unknown target kind '{other}'; expected one of: teacher, group, room"
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
