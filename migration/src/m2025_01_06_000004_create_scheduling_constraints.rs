//! Migration to create the scheduling_constraints table.
//!
//! Constraint values are opaque text; the targeted entity kind is limited to
//! teacher, group or room.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SchedulingConstraints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SchedulingConstraints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SchedulingConstraints::Kind)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SchedulingConstraints::Value).text().not_null())
                    .col(
                        ColumnDef::new(SchedulingConstraints::TargetKind)
                            .string_len(20)
                            .not_null()
                            .check(
                                Expr::col(SchedulingConstraints::TargetKind)
                                    .is_in(["teacher", "group", "room"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(SchedulingConstraints::TargetId)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scheduling_constraints_target")
                    .table(SchedulingConstraints::Table)
                    .col(SchedulingConstraints::TargetKind)
                    .col(SchedulingConstraints::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_scheduling_constraints_target")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SchedulingConstraints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SchedulingConstraints {
    Table,
    Id,
    Kind,
    Value,
    TargetKind,
    TargetId,
}
