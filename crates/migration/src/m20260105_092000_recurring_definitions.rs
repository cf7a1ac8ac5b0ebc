use sea_orm_migration::prelude::*;

use crate::m20260105_090000_users::Users;
use crate::m20260105_091000_goals::Goals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum RecurringDefinitions {
    Table,
    Id,
    UserId,
    Kind,
    Name,
    AmountMinor,
    Category,
    GoalId,
    AnchorDate,
    Frequency,
    Description,
    LastMaterializedPeriodEnd,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecurringDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringDefinitions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecurringDefinitions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringDefinitions::Kind).string().not_null())
                    .col(ColumnDef::new(RecurringDefinitions::Name).string().not_null())
                    .col(
                        ColumnDef::new(RecurringDefinitions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringDefinitions::Category).string())
                    .col(ColumnDef::new(RecurringDefinitions::GoalId).string())
                    .col(
                        ColumnDef::new(RecurringDefinitions::AnchorDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringDefinitions::Frequency)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringDefinitions::Description).string())
                    .col(ColumnDef::new(RecurringDefinitions::LastMaterializedPeriodEnd).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_definitions-user_id")
                            .from(RecurringDefinitions::Table, RecurringDefinitions::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_definitions-goal_id")
                            .from(RecurringDefinitions::Table, RecurringDefinitions::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recurring_definitions-user_id-kind")
                    .table(RecurringDefinitions::Table)
                    .col(RecurringDefinitions::UserId)
                    .col(RecurringDefinitions::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecurringDefinitions::Table).to_owned())
            .await
    }
}
