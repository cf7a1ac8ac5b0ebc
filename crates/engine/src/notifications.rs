//! Notification primitives.
//!
//! Notification kinds are a closed enumeration, one constructor per
//! kind; the constructor owns the human-readable title/message for its
//! condition. The `condition_key` carried by every notification is the
//! same key recorded in the dedup ledger (see [`fire_records`]).
//!
//! [`fire_records`]: super::fire_records

use chrono::{DateTime, NaiveDate, Datelike, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Goal, conditions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BudgetAlert,
    GoalAchieved,
    GoalReminder,
    MonthlySummary,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BudgetAlert => "budget_alert",
            Self::GoalAchieved => "goal_achieved",
            Self::GoalReminder => "goal_reminder",
            Self::MonthlySummary => "monthly_summary",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "budget_alert" => Ok(Self::BudgetAlert),
            "goal_achieved" => Ok(Self::GoalAchieved),
            "goal_reminder" => Ok(Self::GoalReminder),
            "monthly_summary" => Ok(Self::MonthlySummary),
            other => Err(EngineError::KeyNotFound(format!(
                "invalid notification kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub condition_key: String,
    pub created_at: DateTime<Utc>,
}

fn format_amount(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, (minor % 100).abs())
}

impl Notification {
    fn build(
        user_id: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        message: String,
        condition_key: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind,
            title: title.into(),
            message,
            is_read: false,
            condition_key,
            created_at,
        }
    }

    pub fn goal_reminder(goal: &Goal, days_left: i64, created_at: DateTime<Utc>) -> Self {
        let message = match days_left {
            0 => format!("Goal \"{}\" is due today.", goal.name),
            1 => format!("Goal \"{}\" is due tomorrow.", goal.name),
            days => format!("Goal \"{}\" is due in {days} days.", goal.name),
        };
        Self::build(
            &goal.user_id,
            NotificationKind::GoalReminder,
            "Goal deadline approaching",
            message,
            conditions::goal_reminder_key(goal.id, days_left),
            created_at,
        )
    }

    pub fn goal_achieved(goal: &Goal, created_at: DateTime<Utc>) -> Self {
        Self::build(
            &goal.user_id,
            NotificationKind::GoalAchieved,
            "Goal achieved",
            format!(
                "You reached the {} target for \"{}\".",
                format_amount(goal.target_amount_minor),
                goal.name
            ),
            conditions::goal_achieved_key(goal.id),
            created_at,
        )
    }

    pub fn budget_alert(
        user_id: &str,
        month: NaiveDate,
        threshold_percent: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::build(
            user_id,
            NotificationKind::BudgetAlert,
            "Budget alert",
            format!("You have spent {threshold_percent}% of this month's income."),
            conditions::budget_alert_key(month, threshold_percent),
            created_at,
        )
    }

    pub fn monthly_summary(
        user_id: &str,
        month: NaiveDate,
        income_minor: i64,
        expenses_minor: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::build(
            user_id,
            NotificationKind::MonthlySummary,
            "Monthly summary",
            format!(
                "In {:04}-{:02} you earned {} and spent {}.",
                month.year(),
                month.month(),
                format_amount(income_minor),
                format_amount(expenses_minor)
            ),
            conditions::monthly_summary_key(month),
            created_at,
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub condition_key: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(notification.id.to_string()),
            user_id: ActiveValue::Set(notification.user_id.clone()),
            kind: ActiveValue::Set(notification.kind.as_str().to_string()),
            title: ActiveValue::Set(notification.title.clone()),
            message: ActiveValue::Set(notification.message.clone()),
            is_read: ActiveValue::Set(notification.is_read),
            condition_key: ActiveValue::Set(notification.condition_key.clone()),
            created_at: ActiveValue::Set(notification.created_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("notification not exists".to_string()))?,
            user_id: model.user_id,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            condition_key: model.condition_key,
            created_at: model.created_at,
        })
    }
}
