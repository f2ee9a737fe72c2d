//! Teacher entity model
//!
//! Teachers carry free-form availability and preference maps stored as JSON.
//! Subjects are linked through the `teacher_subjects` association table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

/// Teacher entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub last_name: String,

    pub first_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Availability map, stored as given
    #[sea_orm(column_type = "JsonBinary")]
    pub availability: Option<JsonValue>,

    /// Preference map, stored as given
    #[sea_orm(column_type = "JsonBinary")]
    pub preferences: Option<JsonValue>,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_subject::Entity")]
    TeacherSubject,
}

impl Related<super::teacher_subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherSubject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
