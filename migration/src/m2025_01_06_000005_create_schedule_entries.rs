//! Migration to create the schedule_entries table.
//!
//! Every reference is `ON DELETE RESTRICT`: a teacher, group, room or subject
//! still used by the timetable cannot be removed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduleEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduleEntries::TeacherId).integer().not_null())
                    .col(ColumnDef::new(ScheduleEntries::GroupId).integer().not_null())
                    .col(ColumnDef::new(ScheduleEntries::RoomId).integer().not_null())
                    .col(ColumnDef::new(ScheduleEntries::SubjectId).integer().not_null())
                    .col(ColumnDef::new(ScheduleEntries::Day).date().not_null())
                    .col(ColumnDef::new(ScheduleEntries::StartTime).time().not_null())
                    .col(ColumnDef::new(ScheduleEntries::EndTime).time().not_null())
                    .check(
                        Expr::col(ScheduleEntries::EndTime)
                            .gt(Expr::col(ScheduleEntries::StartTime)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_teacher_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_group_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_room_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_entries_subject_id")
                            .from(ScheduleEntries::Table, ScheduleEntries::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing filters hit these two columns together with the day
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_entries_group_day")
                    .table(ScheduleEntries::Table)
                    .col(ScheduleEntries::GroupId)
                    .col(ScheduleEntries::Day)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_entries_teacher_day")
                    .table(ScheduleEntries::Table)
                    .col(ScheduleEntries::TeacherId)
                    .col(ScheduleEntries::Day)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_schedule_entries_group_day")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_schedule_entries_teacher_day")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ScheduleEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduleEntries {
    Table,
    Id,
    TeacherId,
    GroupId,
    RoomId,
    SubjectId,
    Day,
    StartTime,
    EndTime,
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
}
