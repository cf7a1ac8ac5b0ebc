//! Dedup ledger for fired notification conditions.
//!
//! One row per `(user_id, condition_key)`, enforced by the composite
//! primary key. The row's existence is the dedup gate: inserting it is
//! the single atomic "has this condition already notified" check, and
//! rows are never deleted by the engine. Deleting a notification leaves
//! its fire record behind, so a fired condition can never re-fire.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_fires")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub condition_key: String,
    pub fired_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
