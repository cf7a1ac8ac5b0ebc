//! Notification store lifecycle: listing, read flags, deletion.
//!
//! Everything is scoped to the calling user; a notification owned by
//! someone else behaves exactly like a missing one. Deletion touches
//! only the `notifications` table, never the fire-record ledger.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Notification, NotificationKind, ResultEngine, notifications};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationFilter {
    All,
    Unread,
    Kind(NotificationKind),
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self::All
    }
}

impl TryFrom<&str> for NotificationFilter {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            other => Ok(Self::Kind(NotificationKind::try_from(other)?)),
        }
    }
}

impl Engine {
    /// Lists the user's notifications newest first, plus the unread
    /// count for the same filter.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        filter: NotificationFilter,
    ) -> ResultEngine<(Vec<Notification>, u64)> {
        let mut query = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt);
        match filter {
            NotificationFilter::All => {}
            NotificationFilter::Unread => {
                query = query.filter(notifications::Column::IsRead.eq(false));
            }
            NotificationFilter::Kind(kind) => {
                query = query.filter(notifications::Column::Kind.eq(kind.as_str()));
            }
        }

        let models = query.all(&self.database).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Notification::try_from(model)?);
        }

        let mut unread_query = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false));
        if let NotificationFilter::Kind(kind) = filter {
            unread_query = unread_query.filter(notifications::Column::Kind.eq(kind.as_str()));
        }
        let unread_count = unread_query.count(&self.database).await?;

        Ok((out, unread_count))
    }

    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        notification_id: Uuid,
    ) -> ResultEngine<Notification> {
        let model = notifications::Entity::find_by_id(notification_id.to_string())
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("notification not exists".to_string()))?;

        let mut active = model.into_active_model();
        active.is_read = ActiveValue::Set(true);
        let updated = active.update(&self.database).await?;
        Notification::try_from(updated)
    }

    /// Marks every unread notification read; returns how many changed.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> ResultEngine<u64> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_notification(
        &self,
        user_id: &str,
        notification_id: Uuid,
    ) -> ResultEngine<()> {
        let result = notifications::Entity::delete_many()
            .filter(notifications::Column::Id.eq(notification_id.to_string()))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "notification not exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Deletes all of the user's notifications; fire records stay.
    pub async fn delete_all_notifications(&self, user_id: &str) -> ResultEngine<u64> {
        let result = notifications::Entity::delete_many()
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}
