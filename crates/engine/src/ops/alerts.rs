//! Notification checks: condition evaluation + dedup + row creation.
//!
//! The fire-record insert is the single source of truth for "has this
//! condition already notified". A losing concurrent writer observes the
//! constraint violation, re-checks, and treats it as already fired;
//! deleting a notification never un-fires its condition.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Statement, TransactionTrait,
};

use crate::{
    DefinitionKind, Goal, Notification, ResultEngine, conditions, fire_records, goals,
    notifications,
};

use super::Engine;

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl Engine {
    /// Evaluates reminder and achievement conditions for the user's
    /// goals and returns the notifications created by this call.
    ///
    /// Already-fired conditions are skipped silently, so repeated and
    /// concurrent checks are safe.
    pub async fn check_goal_reminders(&self, user_id: &str) -> ResultEngine<Vec<Notification>> {
        self.check_goal_reminders_as_of(user_id, Utc::now().date_naive())
            .await
    }

    /// Same as [`Engine::check_goal_reminders`] with an explicit today.
    pub async fn check_goal_reminders_as_of(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> ResultEngine<Vec<Notification>> {
        let models = goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;

        let now = Utc::now();
        let mut fired = Vec::new();
        for model in models {
            let goal = Goal::try_from(model)?;
            if conditions::goal_achieved(&goal) {
                if let Some(notification) = self
                    .fire_once(Notification::goal_achieved(&goal, now))
                    .await?
                {
                    fired.push(notification);
                }
            } else if let Some(days_left) = conditions::goal_reminder_due(&goal, today) {
                if let Some(notification) = self
                    .fire_once(Notification::goal_reminder(&goal, days_left, now))
                    .await?
                {
                    fired.push(notification);
                }
            }
        }
        Ok(fired)
    }

    /// Evaluates budget thresholds for the current month and, once per
    /// month, emits the previous month's summary.
    pub async fn check_budget_alerts(&self, user_id: &str) -> ResultEngine<Vec<Notification>> {
        self.check_budget_alerts_as_of(user_id, Utc::now().date_naive())
            .await
    }

    /// Same as [`Engine::check_budget_alerts`] with an explicit today.
    pub async fn check_budget_alerts_as_of(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> ResultEngine<Vec<Notification>> {
        let now = Utc::now();
        let mut fired = Vec::new();

        let (income, expenses) = self.month_totals(user_id, month_start(today)).await?;
        for threshold in conditions::budget_thresholds_crossed(expenses, income) {
            if let Some(notification) = self
                .fire_once(Notification::budget_alert(user_id, today, threshold, now))
                .await?
            {
                fired.push(notification);
            }
        }

        if let Some(previous) = month_start(today).pred_opt().map(month_start) {
            let (prev_income, prev_expenses) = self.month_totals(user_id, previous).await?;
            if prev_income > 0 || prev_expenses > 0 {
                if let Some(notification) = self
                    .fire_once(Notification::monthly_summary(
                        user_id,
                        previous,
                        prev_income,
                        prev_expenses,
                        now,
                    ))
                    .await?
                {
                    fired.push(notification);
                }
            }
        }

        Ok(fired)
    }

    /// Inserts the fire record and the notification atomically.
    ///
    /// Returns `None` when the condition had already fired (the insert
    /// hit the `(user_id, condition_key)` primary key), which is a
    /// success-no-op, not an error.
    async fn fire_once(&self, notification: Notification) -> ResultEngine<Option<Notification>> {
        let db_tx = self.database.begin().await?;

        let record = fire_records::ActiveModel {
            user_id: ActiveValue::Set(notification.user_id.clone()),
            condition_key: ActiveValue::Set(notification.condition_key.clone()),
            fired_at: ActiveValue::Set(notification.created_at),
        };
        if let Err(err) = record.insert(&db_tx).await {
            db_tx.rollback().await?;
            let already_fired = fire_records::Entity::find_by_id((
                notification.user_id.clone(),
                notification.condition_key.clone(),
            ))
            .one(&self.database)
            .await?
            .is_some();
            if already_fired {
                return Ok(None);
            }
            return Err(err.into());
        }

        notifications::ActiveModel::from(&notification)
            .insert(&db_tx)
            .await?;
        db_tx.commit().await?;
        Ok(Some(notification))
    }

    /// Returns `(income, expenses)` ledger totals for the month
    /// starting at `month_start`.
    async fn month_totals(
        &self,
        user_id: &str,
        month_start: NaiveDate,
    ) -> ResultEngine<(i64, i64)> {
        let next_month = month_start
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(month_start);
        let backend = self.database.get_database_backend();

        let mut totals = [0i64; 2];
        for (slot, kind) in [DefinitionKind::Income, DefinitionKind::Expense]
            .into_iter()
            .enumerate()
        {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM transactions \
                 WHERE user_id = ? AND kind = ? AND occurred_on >= ? AND occurred_on < ?",
                vec![
                    user_id.into(),
                    kind.as_str().into(),
                    month_start.into(),
                    next_month.into(),
                ],
            );
            let row = self.database.query_one(stmt).await?;
            totals[slot] = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        }

        Ok((totals[0], totals[1]))
    }
}
