//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. Natural keys
//! (usernames, course codes, class-sections, attendance and grade keys) are
//! enforced with UNIQUE indexes rather than read-then-write checks.

mod academics;
mod materials;
mod notifications;
mod records;
mod repository;

pub use materials::MaterialScope;
pub use records::{AttendanceMark, GradeMark};
pub use repository::*;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Fixed-width UTC timestamp, so string order equals time order.
pub(crate) fn timestamp() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp; unreadable values fall back to the epoch.
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('admin', 'teacher', 'student')),
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            postal_code TEXT,
            date_of_birth TEXT,
            class TEXT,
            roll_number TEXT,
            subjects TEXT,
            classes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);
        CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
        CREATE INDEX IF NOT EXISTS idx_users_class ON users(class);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            department TEXT NOT NULL,
            credits INTEGER NOT NULL,
            semester TEXT NOT NULL,
            description TEXT,
            instructors TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_courses_code ON courses(code);

        CREATE TABLE IF NOT EXISTS classes (
            id TEXT PRIMARY KEY,
            division TEXT NOT NULL,
            department TEXT NOT NULL,
            year TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_classes_section
            ON classes(division, department, year);

        CREATE TABLE IF NOT EXISTS timetables (
            label TEXT PRIMARY KEY,
            time_slots TEXT NOT NULL DEFAULT '[]',
            entries TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            site_name TEXT NOT NULL DEFAULT '',
            registration_enabled INTEGER NOT NULL DEFAULT 0,
            backup_cron TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            class TEXT NOT NULL,
            date TEXT NOT NULL,
            subject TEXT NOT NULL,
            status INTEGER NOT NULL,
            marked_by TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_key
            ON attendance(student_id, date, subject);

        CREATE TABLE IF NOT EXISTS grades (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            class TEXT NOT NULL,
            subject TEXT NOT NULL,
            exam_type TEXT NOT NULL,
            marks REAL NOT NULL,
            teacher_id TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_grades_key
            ON grades(student_id, subject, exam_type);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            audience TEXT NOT NULL CHECK (audience IN ('all', 'students', 'class')),
            class TEXT,
            priority TEXT NOT NULL,
            expires_at TEXT,
            created_by TEXT NOT NULL,
            creator_role TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            title TEXT,
            subject TEXT NOT NULL,
            class TEXT NOT NULL,
            description TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            teacher_name TEXT NOT NULL,
            upload_date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS syllabi (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            course_code TEXT NOT NULL,
            credits INTEGER NOT NULL,
            class TEXT NOT NULL,
            description TEXT NOT NULL,
            units TEXT NOT NULL,
            reference_books TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            teacher_name TEXT NOT NULL,
            upload_date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notes_class ON notes(class);
        CREATE INDEX IF NOT EXISTS idx_notes_teacher ON notes(teacher_id);
        CREATE INDEX IF NOT EXISTS idx_syllabi_class ON syllabi(class);
        CREATE INDEX IF NOT EXISTS idx_syllabi_teacher ON syllabi(teacher_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Convert a storage error, replacing the generic conflict message.
pub(crate) fn with_conflict_message(err: sqlx::Error, message: &str) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::Conflict(message.to_string()),
        other => other,
    }
}

/// Encode a string list column.
pub(crate) fn to_json_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a string list column, tolerating NULL and malformed values.
pub(crate) fn parse_json_array(s: Option<String>) -> Vec<String> {
    s.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}
