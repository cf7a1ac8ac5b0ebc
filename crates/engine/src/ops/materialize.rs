//! Materialization of recurring definitions into ledger rows.
//!
//! There is no scheduler: clients poll the check endpoints and every
//! call replays `due_periods` against the persisted watermark. Each due
//! period commits as one DB transaction that inserts the ledger row and
//! compare-and-swaps `last_materialized_period_end`, so a crash or a
//! concurrent duplicate call can never be observed as a half-applied
//! period. The unique index on `(source_definition_id, occurred_on)`
//! backstops the CAS.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};

use crate::{
    DefinitionKind, EngineError, RecurringDefinition, ResultEngine, Transaction, goals, period,
    recurring, transactions,
};

use super::Engine;

enum PeriodOutcome {
    Created,
    /// A concurrent caller already committed this period.
    AlreadyMaterialized,
}

impl Engine {
    /// Materializes every elapsed period of the user's definitions of
    /// the given kind, up to today.
    ///
    /// Returns the number of ledger rows created; zero means the caller
    /// is up to date. Safe to call repeatedly and concurrently.
    pub async fn materialize(&self, user_id: &str, kind: DefinitionKind) -> ResultEngine<u64> {
        self.materialize_as_of(user_id, kind, Utc::now().date_naive())
            .await
    }

    /// Same as [`Engine::materialize`] with an explicit reference date.
    pub async fn materialize_as_of(
        &self,
        user_id: &str,
        kind: DefinitionKind,
        as_of: NaiveDate,
    ) -> ResultEngine<u64> {
        let models = recurring::Entity::find()
            .filter(recurring::Column::UserId.eq(user_id))
            .filter(recurring::Column::Kind.eq(kind.as_str()))
            .all(&self.database)
            .await?;

        let mut created = 0;
        for model in models {
            let definition_id = model.id.clone();
            let outcome = match RecurringDefinition::try_from(model) {
                Ok(definition) => self.materialize_definition(&definition, as_of).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(count) => created += count,
                // One malformed definition must not starve the others.
                Err(EngineError::InvalidDefinition(reason)) => {
                    tracing::warn!(
                        definition_id = %definition_id,
                        %reason,
                        "skipping malformed recurring definition"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(created)
    }

    async fn materialize_definition(
        &self,
        definition: &RecurringDefinition,
        as_of: NaiveDate,
    ) -> ResultEngine<u64> {
        if definition.kind == DefinitionKind::Contribution {
            self.require_contribution_goal(definition).await?;
        }

        let due = period::due_periods(
            definition.anchor_date,
            definition.frequency,
            definition.last_materialized_period_end,
            as_of,
        );

        // Oldest first, advancing the expected watermark with each
        // commit, so the stored watermark can never skip an uncommitted
        // earlier period.
        let mut watermark = definition.last_materialized_period_end;
        let mut created = 0;
        for period_end in due {
            match self
                .materialize_period(definition, watermark, period_end)
                .await?
            {
                PeriodOutcome::Created => {
                    created += 1;
                    watermark = Some(period_end);
                }
                PeriodOutcome::AlreadyMaterialized => break,
            }
        }
        Ok(created)
    }

    /// One atomic unit: ledger insert + watermark CAS (+ goal bump for
    /// contributions). Commits fully or not at all.
    async fn materialize_period(
        &self,
        definition: &RecurringDefinition,
        expected_watermark: Option<NaiveDate>,
        period_end: NaiveDate,
    ) -> ResultEngine<PeriodOutcome> {
        let db_tx = self.database.begin().await?;

        let tx = Transaction::from_definition(definition, period_end);
        if let Err(err) = transactions::ActiveModel::from(&tx).insert(&db_tx).await {
            db_tx.rollback().await?;
            // The unique index on (source_definition_id, occurred_on)
            // rejects duplicates; re-check before treating the failure
            // as a real error.
            let already = transactions::Entity::find()
                .filter(
                    transactions::Column::SourceDefinitionId.eq(definition.id.to_string()),
                )
                .filter(transactions::Column::OccurredOn.eq(period_end))
                .one(&self.database)
                .await?
                .is_some();
            if already {
                return Ok(PeriodOutcome::AlreadyMaterialized);
            }
            return Err(err.into());
        }

        let cas = recurring::Entity::update_many()
            .col_expr(
                recurring::Column::LastMaterializedPeriodEnd,
                Expr::value(period_end),
            )
            .filter(recurring::Column::Id.eq(definition.id.to_string()))
            .filter(match expected_watermark {
                Some(previous) => recurring::Column::LastMaterializedPeriodEnd.eq(previous),
                None => recurring::Column::LastMaterializedPeriodEnd.is_null(),
            })
            .exec(&db_tx)
            .await?;
        if cas.rows_affected == 0 {
            // Lost the race: someone advanced the watermark under us.
            db_tx.rollback().await?;
            return Ok(PeriodOutcome::AlreadyMaterialized);
        }

        if definition.kind == DefinitionKind::Contribution {
            if let Some(goal_id) = definition.goal_id {
                goals::Entity::update_many()
                    .col_expr(
                        goals::Column::CurrentAmountMinor,
                        Expr::col(goals::Column::CurrentAmountMinor)
                            .add(definition.amount_minor),
                    )
                    .filter(goals::Column::Id.eq(goal_id.to_string()))
                    .exec(&db_tx)
                    .await?;
            }
        }

        db_tx.commit().await?;
        Ok(PeriodOutcome::Created)
    }

    async fn require_contribution_goal(
        &self,
        definition: &RecurringDefinition,
    ) -> ResultEngine<()> {
        let goal_id = definition.goal_id.ok_or_else(|| {
            EngineError::InvalidDefinition(
                "contribution definition has no goal".to_string(),
            )
        })?;
        let goal = goals::Entity::find_by_id(goal_id.to_string())
            .filter(goals::Column::UserId.eq(definition.user_id.clone()))
            .one(&self.database)
            .await?;
        if goal.is_none() {
            return Err(EngineError::InvalidDefinition(
                "contribution goal not exists".to_string(),
            ));
        }
        Ok(())
    }
}
