//! Recurring definition primitives.
//!
//! A `RecurringDefinition` is a user-authored template (amount, cadence,
//! anchor date) that the materializer turns into concrete ledger rows.
//! The engine only ever advances `last_materialized_period_end`; creation
//! and editing belong to the CRUD surface.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Frequency, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Income,
    Expense,
    Contribution,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Contribution => "contribution",
        }
    }
}

impl TryFrom<&str> for DefinitionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "contribution" => Ok(Self::Contribution),
            other => Err(EngineError::InvalidDefinition(format!(
                "invalid definition kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDefinition {
    pub id: Uuid,
    pub user_id: String,
    pub kind: DefinitionKind,
    pub name: String,
    pub amount_minor: i64,
    pub category: Option<String>,
    /// Target goal for `contribution` definitions.
    pub goal_id: Option<Uuid>,
    pub anchor_date: NaiveDate,
    pub frequency: Frequency,
    pub description: Option<String>,
    /// Watermark: the last period boundary already materialized.
    ///
    /// Monotonically non-decreasing, always a period boundary of
    /// `frequency`. `None` until the first materialization.
    pub last_materialized_period_end: Option<NaiveDate>,
}

impl RecurringDefinition {
    pub fn new(
        user_id: String,
        kind: DefinitionKind,
        name: String,
        amount_minor: i64,
        anchor_date: NaiveDate,
        frequency: Frequency,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            name,
            amount_minor,
            category: None,
            goal_id: None,
            anchor_date,
            frequency,
            description: None,
            last_materialized_period_end: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub name: String,
    pub amount_minor: i64,
    pub category: Option<String>,
    pub goal_id: Option<String>,
    pub anchor_date: Date,
    pub frequency: String,
    pub description: Option<String>,
    pub last_materialized_period_end: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RecurringDefinition> for ActiveModel {
    fn from(definition: &RecurringDefinition) -> Self {
        Self {
            id: ActiveValue::Set(definition.id.to_string()),
            user_id: ActiveValue::Set(definition.user_id.clone()),
            kind: ActiveValue::Set(definition.kind.as_str().to_string()),
            name: ActiveValue::Set(definition.name.clone()),
            amount_minor: ActiveValue::Set(definition.amount_minor),
            category: ActiveValue::Set(definition.category.clone()),
            goal_id: ActiveValue::Set(definition.goal_id.map(|id| id.to_string())),
            anchor_date: ActiveValue::Set(definition.anchor_date),
            frequency: ActiveValue::Set(definition.frequency.as_str().to_string()),
            description: ActiveValue::Set(definition.description.clone()),
            last_materialized_period_end: ActiveValue::Set(
                definition.last_materialized_period_end,
            ),
        }
    }
}

impl TryFrom<Model> for RecurringDefinition {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| {
                EngineError::InvalidDefinition(format!("invalid definition id: {}", model.id))
            })?,
            user_id: model.user_id,
            kind: DefinitionKind::try_from(model.kind.as_str())?,
            name: model.name,
            amount_minor: model.amount_minor,
            category: model.category,
            goal_id: model
                .goal_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|_| EngineError::InvalidDefinition("invalid goal id".to_string()))?,
            anchor_date: model.anchor_date,
            frequency: Frequency::try_from(model.frequency.as_str())?,
            description: model.description,
            last_materialized_period_end: model.last_materialized_period_end,
        })
    }
}
