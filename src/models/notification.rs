//! Notifications and the audience visibility rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Role;
use crate::errors::AppError;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Students,
    Class,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Students => "students",
            Audience::Class => "class",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all" => Some(Audience::All),
            "students" => Some(Audience::Students),
            "class" => Some(Audience::Class),
            _ => None,
        }
    }
}

/// A message posted by an admin or teacher.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub audience: Audience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub priority: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub creator_role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    /// Student rule: everyone, all students, or the student's own class.
    pub fn visible_to_student(&self, class: Option<&str>, now: DateTime<Utc>) -> bool {
        if self.is_expired(now) {
            return false;
        }
        match self.audience {
            Audience::All | Audience::Students => true,
            Audience::Class => class.is_some() && self.class.as_deref() == class,
        }
    }

    /// Teacher rule: everyone, or one of the teacher's classes.
    pub fn visible_to_teacher(&self, classes: &[String], now: DateTime<Utc>) -> bool {
        if self.is_expired(now) {
            return false;
        }
        match self.audience {
            Audience::All => true,
            Audience::Students => false,
            Audience::Class => self
                .class
                .as_ref()
                .is_some_and(|class| classes.contains(class)),
        }
    }
}

/// Request body for creating or editing a notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, alias = "expires_at")]
    pub expires_at: Option<String>,
}

/// A validated notification ready to be stored.
#[derive(Debug, Clone)]
pub struct NotificationFields {
    pub title: String,
    pub message: String,
    pub audience: Audience,
    pub class: Option<String>,
    pub priority: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    pub fn validate(&self) -> Result<NotificationFields, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let audience = match self.audience.as_deref().map(str::trim) {
            None | Some("") => Audience::All,
            Some(raw) => Audience::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown audience: {}", raw)))?,
        };

        let class = self
            .class
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        if audience == Audience::Class && class.is_none() {
            return Err(AppError::Validation(
                "Class is required for class notifications".to_string(),
            ));
        }

        let priority = self
            .priority
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("normal")
            .to_string();

        Ok(NotificationFields {
            title: title.to_string(),
            message: self.message.trim().to_string(),
            audience,
            class,
            priority,
            expires_at: parse_expiry(self.expires_at.as_deref())?,
        })
    }
}

/// Parse a `YYYY-MM-DD` expiry into midnight UTC of that day.
pub fn parse_expiry(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("Invalid expiry date (expected YYYY-MM-DD): {}", raw))
    })?;
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn notification(audience: Audience, class: Option<&str>) -> Notification {
        Notification {
            id: "n1".to_string(),
            title: "Exam schedule".to_string(),
            message: "Mid terms start Monday".to_string(),
            audience,
            class: class.map(str::to_string),
            priority: "normal".to_string(),
            expires_at: None,
            created_by: "admin".to_string(),
            creator_role: Role::Admin,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_expired_class_notification_is_hidden() {
        let now = Utc::now();
        let mut n = notification(Audience::Class, Some("3A"));
        n.expires_at = Some(now - Duration::days(1));

        assert!(!n.visible_to_student(Some("3A"), now));
        assert!(!n.visible_to_teacher(&["3A".to_string()], now));
    }

    #[test]
    fn test_student_visibility() {
        let now = Utc::now();
        assert!(notification(Audience::All, None).visible_to_student(Some("3A"), now));
        assert!(notification(Audience::Students, None).visible_to_student(Some("3A"), now));
        assert!(notification(Audience::Class, Some("3A")).visible_to_student(Some("3A"), now));
        assert!(!notification(Audience::Class, Some("3B")).visible_to_student(Some("3A"), now));
        assert!(!notification(Audience::Class, Some("3A")).visible_to_student(None, now));
    }

    #[test]
    fn test_teacher_visibility() {
        let now = Utc::now();
        let classes = vec!["3A".to_string(), "2B".to_string()];
        assert!(notification(Audience::All, None).visible_to_teacher(&classes, now));
        assert!(!notification(Audience::Students, None).visible_to_teacher(&classes, now));
        assert!(notification(Audience::Class, Some("2B")).visible_to_teacher(&classes, now));
        assert!(!notification(Audience::Class, Some("1C")).visible_to_teacher(&classes, now));
    }

    #[test]
    fn test_future_expiry_is_visible() {
        let now = Utc::now();
        let mut n = notification(Audience::All, None);
        n.expires_at = Some(now + Duration::days(1));
        assert!(n.visible_to_student(None, now));
    }

    #[test]
    fn test_parse_expiry() {
        let parsed = parse_expiry(Some("2024-05-01")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert!(parse_expiry(Some("")).unwrap().is_none());
        assert!(parse_expiry(None).unwrap().is_none());
        assert!(parse_expiry(Some("01/05/2024")).is_err());
    }

    #[test]
    fn test_validate_requires_class_for_class_audience() {
        let request = NotificationRequest {
            title: "Lab closed".to_string(),
            message: String::new(),
            audience: Some("class".to_string()),
            class: Some("  ".to_string()),
            priority: None,
            expires_at: None,
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_defaults() {
        let request = NotificationRequest {
            title: " Welcome ".to_string(),
            message: "Hello".to_string(),
            audience: None,
            class: None,
            priority: None,
            expires_at: None,
        };
        let fields = request.validate().unwrap();
        assert_eq!(fields.title, "Welcome");
        assert_eq!(fields.audience, Audience::All);
        assert_eq!(fields.priority, "normal");
        assert!(fields.expires_at.is_none());
    }
}
