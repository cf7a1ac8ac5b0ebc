//! Pure notification-condition evaluation.
//!
//! These functions decide whether a condition *currently holds*; whether
//! it has already notified is the fire-record ledger's concern. Keeping
//! the two apart means evaluation can run any number of times, in any
//! order, without side effects.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::Goal;

/// Days-before-due-date thresholds for goal reminders, each a distinct
/// condition instance with its own key.
pub const REMINDER_THRESHOLDS_DAYS: [i64; 4] = [7, 3, 1, 0];

/// Spend-ratio thresholds for budget alerts, re-armed every month.
pub const BUDGET_THRESHOLDS_PERCENT: [u8; 3] = [70, 90, 100];

/// Returns the reminder threshold hit today, if any.
///
/// A reminder is only due while the goal is still open; once achieved,
/// the achievement notification takes over.
pub fn goal_reminder_due(goal: &Goal, today: NaiveDate) -> Option<i64> {
    if goal.is_achieved() {
        return None;
    }
    let days_left = (goal.due_date - today).num_days();
    REMINDER_THRESHOLDS_DAYS
        .into_iter()
        .find(|&threshold| days_left == threshold)
}

pub fn goal_achieved(goal: &Goal) -> bool {
    goal.is_achieved()
}

/// Budget thresholds crossed by the current month's spend ratio,
/// lowest first.
pub fn budget_thresholds_crossed(expenses_minor: i64, income_minor: i64) -> Vec<u8> {
    if income_minor <= 0 || expenses_minor <= 0 {
        return Vec::new();
    }
    let ratio_percent = expenses_minor.saturating_mul(100) / income_minor;
    BUDGET_THRESHOLDS_PERCENT
        .into_iter()
        .filter(|&threshold| ratio_percent >= i64::from(threshold))
        .collect()
}

pub fn goal_reminder_key(goal_id: Uuid, threshold_days: i64) -> String {
    format!("goal:{goal_id}:reminder:{threshold_days}")
}

pub fn goal_achieved_key(goal_id: Uuid) -> String {
    format!("goal:{goal_id}:achieved")
}

/// Keyed by year-month so thresholds re-arm when the month rolls over.
pub fn budget_alert_key(month: NaiveDate, threshold_percent: u8) -> String {
    format!(
        "budget:{:04}{:02}:total:{threshold_percent}",
        month.year(),
        month.month()
    )
}

pub fn monthly_summary_key(month: NaiveDate) -> String {
    format!("summary:{:04}{:02}", month.year(), month.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: i64, target: i64, due: NaiveDate) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            name: "Holiday".to_string(),
            target_amount_minor: target,
            current_amount_minor: current,
            due_date: due,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reminder_fires_only_on_thresholds() {
        let goal = goal(0, 10_000, date(2025, 6, 10));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 3)), Some(7));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 4)), None);
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 7)), Some(3));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 9)), Some(1));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 10)), Some(0));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 11)), None);
    }

    #[test]
    fn achieved_goal_gets_no_reminder() {
        let goal = goal(10_000, 10_000, date(2025, 6, 10));
        assert_eq!(goal_reminder_due(&goal, date(2025, 6, 3)), None);
        assert!(goal_achieved(&goal));
    }

    #[test]
    fn budget_thresholds_accumulate() {
        assert_eq!(budget_thresholds_crossed(0, 100_000), Vec::<u8>::new());
        assert_eq!(budget_thresholds_crossed(69_999, 100_000), Vec::<u8>::new());
        assert_eq!(budget_thresholds_crossed(70_000, 100_000), vec![70]);
        assert_eq!(budget_thresholds_crossed(95_000, 100_000), vec![70, 90]);
        assert_eq!(budget_thresholds_crossed(120_000, 100_000), vec![70, 90, 100]);
    }

    #[test]
    fn budget_needs_income() {
        assert_eq!(budget_thresholds_crossed(50_000, 0), Vec::<u8>::new());
    }

    #[test]
    fn keys_identify_condition_instances() {
        let id = Uuid::nil();
        assert_eq!(
            goal_reminder_key(id, 7),
            format!("goal:{id}:reminder:7")
        );
        assert_eq!(goal_achieved_key(id), format!("goal:{id}:achieved"));
        assert_eq!(budget_alert_key(date(2025, 3, 15), 90), "budget:202503:total:90");
        assert_eq!(monthly_summary_key(date(2025, 3, 1)), "summary:202503");
    }
}
