//! Site settings, report counters and dashboard payloads.

use serde::{Deserialize, Serialize};

use super::{Notification, UploadActivity, User};

/// Site-wide settings, stored as a single row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub registration_enabled: bool,
    #[serde(default)]
    pub backup_cron: String,
}

/// Record counts shown on the admin reports page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportStats {
    pub students: i64,
    pub teachers: i64,
    pub admins: i64,
    pub courses: i64,
    pub attendance: i64,
    pub grades: i64,
    pub notes: i64,
    pub syllabus: i64,
}

/// Student and admin dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub notifications: Vec<Notification>,
}

/// Teacher dashboard with upload statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub user: User,
    pub notifications: Vec<Notification>,
    pub notes_count: i64,
    pub syllabus_count: i64,
    pub activities: Vec<UploadActivity>,
}

/// A teacher's subjects and classes, used by the grading screen.
#[derive(Debug, Clone, Serialize)]
pub struct TeachingLoad {
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
}
