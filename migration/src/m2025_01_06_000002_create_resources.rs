//! Migration to create the teachers, rooms, groups and subjects tables.
//!
//! Positive-quantity invariants (room capacity, group size, subject
//! duration) are declared as CHECK constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teachers::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Teachers::FirstName).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Teachers::Email)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teachers::Availability).json_binary().null())
                    .col(ColumnDef::new(Teachers::Preferences).json_binary().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Rooms::Capacity)
                            .integer()
                            .not_null()
                            .check(Expr::col(Rooms::Capacity).gt(0)),
                    )
                    .col(ColumnDef::new(Rooms::Equipment).json_binary().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Groups::StudentCount)
                            .integer()
                            .not_null()
                            .check(Expr::col(Groups::StudentCount).gt(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Subjects::DurationHours)
                            .integer()
                            .not_null()
                            .check(Expr::col(Subjects::DurationHours).gt(0)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
    LastName,
    FirstName,
    Email,
    Availability,
    Preferences,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Name,
    Capacity,
    Equipment,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    StudentCount,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    Name,
    DurationHours,
}
