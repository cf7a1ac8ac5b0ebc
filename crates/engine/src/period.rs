//! Period arithmetic for recurring definitions.
//!
//! `due_periods` is a pure function: given a definition's anchor date,
//! cadence and watermark, it returns every period boundary that still has
//! to be materialized up to a reference date. It holds no state, so the
//! sequence is finite and restartable from any watermark.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidDefinition(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

/// Returns the nth occurrence of the cadence, counting the anchor itself
/// as occurrence zero.
///
/// Monthly and yearly occurrences target the anchor's day-of-month and
/// clamp to the end of shorter months without shifting the anchor: a
/// definition anchored on the 31st goes back to the 31st whenever the
/// month has one, and a Feb 29 anchor falls on Feb 28 off leap years.
fn occurrence(anchor: NaiveDate, frequency: Frequency, n: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(n))),
        Frequency::Monthly => {
            let months = anchor.month0() + n;
            let year = anchor.year() + (months / 12) as i32;
            let month = months % 12 + 1;
            Some(clamped_day(year, month, anchor.day()))
        }
        Frequency::Yearly => Some(clamped_day(
            anchor.year() + n as i32,
            anchor.month(),
            anchor.day(),
        )),
    }
}

/// Day-of-month clamped to the target month's length.
fn clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        // The first of a month always exists and has a predecessor for
        // any year in chrono's range.
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MIN)
    })
}

/// Ordered period boundaries still due for materialization.
///
/// Every returned date is strictly after `last_materialized` (or the
/// first occurrence at/after the anchor when the definition has never
/// been materialized) and not after `as_of`. An empty result means the
/// caller is up to date.
pub fn due_periods(
    anchor: NaiveDate,
    frequency: Frequency,
    last_materialized: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Vec<NaiveDate> {
    let mut due = Vec::new();
    for n in 0.. {
        let Some(date) = occurrence(anchor, frequency, n) else {
            break;
        };
        if date > as_of {
            break;
        }
        match last_materialized {
            Some(watermark) if date <= watermark => continue,
            _ => due.push(date),
        }
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_steps_from_anchor() {
        let due = due_periods(date(2025, 1, 6), Frequency::Weekly, None, date(2025, 1, 27));
        assert_eq!(
            due,
            vec![
                date(2025, 1, 6),
                date(2025, 1, 13),
                date(2025, 1, 20),
                date(2025, 1, 27)
            ]
        );
    }

    #[test]
    fn monthly_clamps_to_short_months_without_drifting() {
        let due = due_periods(
            date(2025, 1, 31),
            Frequency::Monthly,
            None,
            date(2025, 4, 30),
        );
        assert_eq!(
            due,
            vec![
                date(2025, 1, 31),
                date(2025, 2, 28),
                date(2025, 3, 31),
                date(2025, 4, 30)
            ]
        );
    }

    #[test]
    fn monthly_clamps_to_feb_29_in_leap_years() {
        let due = due_periods(
            date(2024, 1, 31),
            Frequency::Monthly,
            None,
            date(2024, 3, 31),
        );
        assert_eq!(
            due,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]
        );
    }

    #[test]
    fn yearly_feb_29_anchor_clamps_off_leap_years() {
        let due = due_periods(
            date(2024, 2, 29),
            Frequency::Yearly,
            None,
            date(2026, 3, 1),
        );
        assert_eq!(
            due,
            vec![date(2024, 2, 29), date(2025, 2, 28), date(2026, 2, 28)]
        );
    }

    #[test]
    fn watermark_excludes_already_materialized_periods() {
        let due = due_periods(
            date(2025, 1, 31),
            Frequency::Monthly,
            Some(date(2025, 2, 28)),
            date(2025, 4, 15),
        );
        assert_eq!(due, vec![date(2025, 3, 31)]);
    }

    #[test]
    fn up_to_date_definition_yields_nothing() {
        let due = due_periods(
            date(2025, 1, 6),
            Frequency::Weekly,
            Some(date(2025, 1, 20)),
            date(2025, 1, 26),
        );
        assert!(due.is_empty());
    }

    #[test]
    fn future_anchor_yields_nothing() {
        let due = due_periods(date(2025, 6, 1), Frequency::Monthly, None, date(2025, 5, 1));
        assert!(due.is_empty());
    }
}
