use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod recurring {
    use super::*;

    /// Response of the `check` endpoints: how many ledger rows this
    /// call materialized. Zero means the caller was already up to date.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckResponse {
        pub created: u64,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationKind {
        BudgetAlert,
        GoalAchieved,
        GoalReminder,
        MonthlySummary,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub kind: NotificationKind,
        pub title: String,
        pub message: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Response of the reminder/budget check endpoints: only the
    /// notifications created by this call.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckedResponse {
        pub notifications: Vec<NotificationView>,
    }

    /// Query parameters for listing.
    ///
    /// `filter` is `all`, `unread` or a notification kind string;
    /// missing means `all`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListParams {
        pub filter: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListResponse {
        pub notifications: Vec<NotificationView>,
        pub unread_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkAllReadResponse {
        pub updated: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteResponse {
        pub ok: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteAllResponse {
        pub deleted: u64,
    }
}
