//! Notification API endpoints: checks plus store lifecycle.

use api_types::notification::{
    CheckedResponse, DeleteAllResponse, DeleteResponse, ListParams, ListResponse,
    MarkAllReadResponse, NotificationKind as ApiKind, NotificationView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{Notification, NotificationFilter};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::NotificationKind) -> ApiKind {
    match kind {
        engine::NotificationKind::BudgetAlert => ApiKind::BudgetAlert,
        engine::NotificationKind::GoalAchieved => ApiKind::GoalAchieved,
        engine::NotificationKind::GoalReminder => ApiKind::GoalReminder,
        engine::NotificationKind::MonthlySummary => ApiKind::MonthlySummary,
    }
}

fn map_view(notification: Notification) -> NotificationView {
    NotificationView {
        id: notification.id,
        kind: map_kind(notification.kind),
        title: notification.title,
        message: notification.message,
        is_read: notification.is_read,
        created_at: notification.created_at,
    }
}

pub async fn check_goal_reminders(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CheckedResponse>, ServerError> {
    let fired = state.engine.check_goal_reminders(&user.username).await?;
    Ok(Json(CheckedResponse {
        notifications: fired.into_iter().map(map_view).collect(),
    }))
}

pub async fn check_budget_alerts(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CheckedResponse>, ServerError> {
    let fired = state.engine.check_budget_alerts(&user.username).await?;
    Ok(Json(CheckedResponse {
        notifications: fired.into_iter().map(map_view).collect(),
    }))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let filter = match params.filter.as_deref() {
        None => NotificationFilter::All,
        Some(value) => NotificationFilter::try_from(value)
            .map_err(|_| ServerError::Generic(format!("invalid filter: {value}")))?,
    };

    let (notifications, unread_count) = state
        .engine
        .list_notifications(&user.username, filter)
        .await?;
    Ok(Json(ListResponse {
        notifications: notifications.into_iter().map(map_view).collect(),
        unread_count,
    }))
}

pub async fn mark_read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationView>, ServerError> {
    let notification = state
        .engine
        .mark_notification_read(&user.username, id)
        .await?;
    Ok(Json(map_view(notification)))
}

pub async fn mark_all_read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MarkAllReadResponse>, ServerError> {
    let updated = state
        .engine
        .mark_all_notifications_read(&user.username)
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

pub async fn delete_one(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ServerError> {
    state.engine.delete_notification(&user.username, id).await?;
    Ok(Json(DeleteResponse { ok: true }))
}

pub async fn delete_all(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<DeleteAllResponse>, ServerError> {
    let deleted = state
        .engine
        .delete_all_notifications(&user.username)
        .await?;
    Ok(Json(DeleteAllResponse { deleted }))
}
