//! Student group entity model
//!
//! Subjects followed by a group are linked through `group_subjects`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

/// Group entity; student count is always positive
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub student_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_subject::Entity")]
    GroupSubject,
}

impl Related<super::group_subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupSubject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
