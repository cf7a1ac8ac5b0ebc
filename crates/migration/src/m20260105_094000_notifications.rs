use sea_orm_migration::prelude::*;

use crate::m20260105_090000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Message,
    IsRead,
    ConditionKey,
    CreatedAt,
}

#[derive(Iden)]
enum NotificationFires {
    Table,
    UserId,
    ConditionKey,
    FiredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).string().not_null())
                    .col(ColumnDef::new(Notifications::IsRead).boolean().not_null())
                    .col(
                        ColumnDef::new(Notifications::ConditionKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-user_id-created_at")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Append-only dedup ledger; the composite primary key is the
        // at-most-once gate for every notification condition.
        manager
            .create_table(
                Table::create()
                    .table(NotificationFires::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationFires::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationFires::ConditionKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationFires::FiredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(NotificationFires::UserId)
                            .col(NotificationFires::ConditionKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notification_fires-user_id")
                            .from(NotificationFires::Table, NotificationFires::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationFires::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        Ok(())
    }
}
