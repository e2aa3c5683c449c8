//! Notification storage.

use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_timestamp, timestamp, Repository};
use crate::errors::AppError;
use crate::models::{Audience, Notification, NotificationFields, Role, User};

const NOTIFICATION_COLUMNS: &str = "id, title, message, audience, class, priority, expires_at, \
    created_by, creator_role, created_at, updated_at";

impl Repository {
    /// All notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notifications ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }

    /// Post a notification on behalf of `author`.
    pub async fn create_notification(
        &self,
        fields: &NotificationFields,
        author: &User,
    ) -> Result<Notification, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO notifications (id, title, message, audience, class, priority, expires_at, created_by, creator_role, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&fields.title)
        .bind(&fields.message)
        .bind(fields.audience.as_str())
        .bind(&fields.class)
        .bind(&fields.priority)
        .bind(fields.expires_at.map(format_timestamp))
        .bind(&author.id)
        .bind(author.role().as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id,
            title: fields.title.clone(),
            message: fields.message.clone(),
            audience: fields.audience,
            class: fields.class.clone(),
            priority: fields.priority.clone(),
            expires_at: fields.expires_at,
            created_by: author.id.clone(),
            creator_role: author.role(),
            created_at: parse_timestamp(&now),
            updated_at: None,
        })
    }

    /// Edit a notification.
    pub async fn update_notification(
        &self,
        id: &str,
        fields: &NotificationFields,
    ) -> Result<Notification, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET title = ?, message = ?, audience = ?, class = ?, priority = ?, expires_at = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&fields.title)
        .bind(&fields.message)
        .bind(fields.audience.as_str())
        .bind(&fields.class)
        .bind(&fields.priority)
        .bind(fields.expires_at.map(format_timestamp))
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }

        let row = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE id = ?",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification_from_row(&row))
    }

    /// Delete a notification.
    pub async fn delete_notification(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }
        Ok(())
    }
}

fn notification_from_row(row: &SqliteRow) -> Notification {
    let audience: String = row.get("audience");
    let creator_role: String = row.get("creator_role");
    let expires_at: Option<String> = row.get("expires_at");
    let created_at: String = row.get("created_at");
    let updated_at: Option<String> = row.get("updated_at");

    Notification {
        id: row.get("id"),
        title: row.get("title"),
        message: row.get("message"),
        audience: Audience::parse(&audience).unwrap_or(Audience::All),
        class: row.get("class"),
        priority: row.get("priority"),
        expires_at: expires_at.as_deref().map(parse_timestamp),
        created_by: row.get("created_by"),
        creator_role: Role::parse(&creator_role).unwrap_or(Role::Admin),
        created_at: parse_timestamp(&created_at),
        updated_at: updated_at.as_deref().map(parse_timestamp),
    }
}
