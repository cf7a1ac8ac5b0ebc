pub use sea_orm_migration::prelude::*;

mod m20260105_090000_users;
mod m20260105_091000_goals;
mod m20260105_092000_recurring_definitions;
mod m20260105_093000_transactions;
mod m20260105_094000_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_090000_users::Migration),
            Box::new(m20260105_091000_goals::Migration),
            Box::new(m20260105_092000_recurring_definitions::Migration),
            Box::new(m20260105_093000_transactions::Migration),
            Box::new(m20260105_094000_notifications::Migration),
        ]
    }
}
