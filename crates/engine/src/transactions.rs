//! Ledger transaction primitives.
//!
//! A `Transaction` is one concrete income, expense or goal-contribution
//! row. Rows created by the materializer carry the originating
//! definition in `source_definition_id`; together with `occurred_on`
//! that pair is unique, which is what makes re-materialization a no-op.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DefinitionKind, EngineError, RecurringDefinition, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: DefinitionKind,
    pub occurred_on: NaiveDate,
    pub amount_minor: i64,
    pub name: String,
    pub description: Option<String>,
    pub source_definition_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        user_id: String,
        kind: DefinitionKind,
        occurred_on: NaiveDate,
        amount_minor: i64,
        name: String,
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
            occurred_on,
            amount_minor,
            name,
            description: None,
            source_definition_id: None,
        })
    }

    /// Materializes one period of a recurring definition.
    pub fn from_definition(definition: &RecurringDefinition, period_end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: definition.user_id.clone(),
            kind: definition.kind,
            occurred_on: period_end,
            amount_minor: definition.amount_minor,
            name: definition.name.clone(),
            description: definition.description.clone(),
            source_definition_id: Some(definition.id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub occurred_on: Date,
    pub amount_minor: i64,
    pub name: String,
    pub description: Option<String>,
    pub source_definition_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring::Entity",
        from = "Column::SourceDefinitionId",
        to = "super::recurring::Column::Id"
    )]
    Definition,
}

impl Related<super::recurring::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Definition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            name: ActiveValue::Set(tx.name.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            source_definition_id: ActiveValue::Set(
                tx.source_definition_id.map(|id| id.to_string()),
            ),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            user_id: model.user_id,
            kind: DefinitionKind::try_from(model.kind.as_str())?,
            occurred_on: model.occurred_on,
            amount_minor: model.amount_minor,
            name: model.name,
            description: model.description,
            source_definition_id: model
                .source_definition_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
        })
    }
}
