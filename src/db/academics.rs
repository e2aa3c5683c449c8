//! Courses, class-sections, timetables and site settings.

use sqlx::{sqlite::SqliteRow, Row};

use super::{parse_json_array, timestamp, to_json_array, with_conflict_message, Repository};
use crate::errors::AppError;
use crate::models::{ClassSection, Course, CourseFields, Settings, Timetable, TimetableEntry};

const COURSE_COLUMNS: &str =
    "id, code, name, department, credits, semester, description, instructors, created_at, updated_at";

impl Repository {
    // ==================== COURSE OPERATIONS ====================

    /// List all courses.
    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM courses ORDER BY code",
            COURSE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// Get a course by ID.
    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    /// Create a course. Codes are unique.
    pub async fn create_course(
        &self,
        code: &str,
        fields: &CourseFields,
    ) -> Result<Course, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();
        let credits = fields
            .credits
            .ok_or_else(|| AppError::Validation("Credits are required".to_string()))?;

        sqlx::query(
            "INSERT INTO courses (id, code, name, department, credits, semester, description, instructors, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(code)
        .bind(&fields.name)
        .bind(&fields.department)
        .bind(credits)
        .bind(&fields.semester)
        .bind(&fields.description)
        .bind(to_json_array(&fields.instructors))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| with_conflict_message(e, "Course code exists"))?;

        Ok(Course {
            id,
            code: code.to_string(),
            name: fields.name.clone(),
            department: fields.department.clone(),
            credits,
            semester: fields.semester.clone(),
            description: fields.description.clone(),
            instructors: fields.instructors.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a course; absent credits keep the stored value.
    pub async fn update_course(&self, id: &str, fields: &CourseFields) -> Result<Course, AppError> {
        let result = sqlx::query(
            "UPDATE courses SET name = ?, department = ?, credits = COALESCE(?, credits), semester = ?, description = ?, instructors = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&fields.name)
        .bind(&fields.department)
        .bind(fields.credits)
        .bind(&fields.semester)
        .bind(&fields.description)
        .bind(to_json_array(&fields.instructors))
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", id)));
        }

        self.get_course(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))
    }

    /// Delete a course.
    pub async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", id)));
        }
        Ok(())
    }

    // ==================== CLASS OPERATIONS ====================

    /// List all class-sections.
    pub async fn list_classes(&self) -> Result<Vec<ClassSection>, AppError> {
        let rows = sqlx::query(
            "SELECT id, division, department, year, created_at FROM classes ORDER BY year, department, division",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(class_from_row).collect())
    }

    /// Create a class-section; the (division, department, year) triple is unique.
    pub async fn create_class(
        &self,
        division: &str,
        department: &str,
        year: &str,
    ) -> Result<ClassSection, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO classes (id, division, department, year, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(division)
        .bind(department)
        .bind(year)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            with_conflict_message(
                e,
                "Class with this division/department/year already exists",
            )
        })?;

        Ok(ClassSection {
            id,
            division: division.to_string(),
            department: department.to_string(),
            year: year.to_string(),
            created_at: now,
        })
    }

    /// Delete a class-section.
    pub async fn delete_class(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Class {} not found", id)));
        }
        Ok(())
    }

    // ==================== TIMETABLE OPERATIONS ====================

    /// Get the timetable filed under `label`.
    pub async fn get_timetable(&self, label: &str) -> Result<Option<Timetable>, AppError> {
        let row = sqlx::query(
            "SELECT label, time_slots, entries, updated_at FROM timetables WHERE label = ?",
        )
        .bind(label)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(timetable_from_row))
    }

    /// Replace the time slots, creating the timetable if needed.
    pub async fn set_time_slots(
        &self,
        label: &str,
        time_slots: &[String],
    ) -> Result<Timetable, AppError> {
        sqlx::query(
            r#"
            INSERT INTO timetables (label, time_slots, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(label) DO UPDATE SET
                time_slots = excluded.time_slots,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(label)
        .bind(to_json_array(time_slots))
        .bind(timestamp())
        .execute(&self.pool)
        .await?;

        self.get_timetable(label)
            .await?
            .ok_or_else(|| AppError::Internal("Timetable vanished after write".to_string()))
    }

    /// Append an entry, creating the timetable if needed.
    pub async fn add_timetable_entry(
        &self,
        label: &str,
        entry: &TimetableEntry,
    ) -> Result<Timetable, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<String> =
            sqlx::query("SELECT entries FROM timetables WHERE label = ?")
                .bind(label)
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| row.get("entries"));

        let mut entries = parse_entries(existing);
        entries.push(entry.clone());
        let entries_json = serde_json::to_string(&entries)?;

        sqlx::query(
            r#"
            INSERT INTO timetables (label, entries, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(label) DO UPDATE SET
                entries = excluded.entries,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(label)
        .bind(&entries_json)
        .bind(timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_timetable(label)
            .await?
            .ok_or_else(|| AppError::Internal("Timetable vanished after write".to_string()))
    }

    /// Remove the entry at `index`.
    pub async fn delete_timetable_entry(
        &self,
        label: &str,
        index: i64,
    ) -> Result<Timetable, AppError> {
        let not_found = || AppError::NotFound("Entry not found".to_string());
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT entries FROM timetables WHERE label = ?")
            .bind(label)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(not_found)?;

        let mut entries = parse_entries(row.get("entries"));
        let idx = usize::try_from(index).map_err(|_| not_found())?;
        if idx >= entries.len() {
            return Err(not_found());
        }
        entries.remove(idx);

        sqlx::query("UPDATE timetables SET entries = ?, updated_at = ? WHERE label = ?")
            .bind(serde_json::to_string(&entries)?)
            .bind(timestamp())
            .bind(label)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_timetable(label).await?.ok_or_else(not_found)
    }

    // ==================== SETTINGS ====================

    /// Current settings, defaults when never saved.
    pub async fn get_settings(&self) -> Result<Settings, AppError> {
        let row = sqlx::query(
            "SELECT site_name, registration_enabled, backup_cron FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| {
                let registration_enabled: i32 = row.get("registration_enabled");
                Settings {
                    site_name: row.get("site_name"),
                    registration_enabled: registration_enabled != 0,
                    backup_cron: row.get("backup_cron"),
                }
            })
            .unwrap_or_default())
    }

    /// Save settings.
    pub async fn save_settings(&self, settings: &Settings) -> Result<Settings, AppError> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, site_name, registration_enabled, backup_cron) VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                site_name = excluded.site_name,
                registration_enabled = excluded.registration_enabled,
                backup_cron = excluded.backup_cron
            "#,
        )
        .bind(&settings.site_name)
        .bind(settings.registration_enabled as i32)
        .bind(&settings.backup_cron)
        .execute(&self.pool)
        .await?;

        Ok(settings.clone())
    }
}

// Helper functions for row conversion

fn course_from_row(row: &SqliteRow) -> Course {
    Course {
        id: row.get("id"),
        code: row.get("code"),
        name: row.get("name"),
        department: row.get("department"),
        credits: row.get("credits"),
        semester: row.get("semester"),
        description: row.get("description"),
        instructors: parse_json_array(row.get("instructors")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn class_from_row(row: &SqliteRow) -> ClassSection {
    ClassSection {
        id: row.get("id"),
        division: row.get("division"),
        department: row.get("department"),
        year: row.get("year"),
        created_at: row.get("created_at"),
    }
}

fn timetable_from_row(row: &SqliteRow) -> Timetable {
    Timetable {
        label: row.get("label"),
        time_slots: parse_json_array(row.get("time_slots")),
        entries: parse_entries(row.get("entries")),
        updated_at: row.get("updated_at"),
    }
}

fn parse_entries(s: Option<String>) -> Vec<TimetableEntry> {
    s.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}
