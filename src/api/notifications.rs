//! Notification management for admins and teachers.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{done, success, ApiResult};
use crate::auth::Principal;
use crate::models::{Notification, NotificationRequest, Role};
use crate::AppState;

const MANAGERS: &[Role] = &[Role::Admin, Role::Teacher];

/// GET /notifications/manage - Every notification, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Notification>> {
    principal.require_any(MANAGERS)?;
    success(state.repo.list_notifications().await?)
}

/// POST /notifications/manage
pub async fn create_notification(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<NotificationRequest>,
) -> ApiResult<Notification> {
    let author = principal.require_any(MANAGERS)?;
    let fields = request.validate()?;

    let notification = state.repo.create_notification(&fields, author).await?;
    tracing::info!(
        "{} {} posted notification {} to {}",
        author.role(),
        author.username,
        notification.id,
        notification.audience.as_str()
    );

    done(notification, "Notification created")
}

/// POST /notifications/{id}/edit
pub async fn update_notification(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<NotificationRequest>,
) -> ApiResult<Notification> {
    principal.require_any(MANAGERS)?;
    let fields = request.validate()?;

    done(
        state.repo.update_notification(&id, &fields).await?,
        "Notification updated",
    )
}

/// POST /notifications/{id}/delete
pub async fn delete_notification(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    principal.require_any(MANAGERS)?;
    state.repo.delete_notification(&id).await?;
    done((), "Notification deleted")
}
