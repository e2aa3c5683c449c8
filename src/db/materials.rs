//! Notes and syllabus metadata. File payloads live in upload storage.

use sqlx::{sqlite::SqliteRow, Row};

use super::{parse_json_array, timestamp, to_json_array, Repository};
use crate::errors::AppError;
use crate::models::{NewNote, NewSyllabus, Note, Syllabus};

const NOTE_COLUMNS: &str = "id, title, subject, class, description, file_name, file_path, \
    teacher_id, teacher_name, upload_date";

const SYLLABUS_COLUMNS: &str = "id, subject, course_code, credits, class, description, units, \
    reference_books, file_name, file_path, teacher_id, teacher_name, upload_date";

/// Which side of a material listing to filter on.
#[derive(Debug, Clone, Copy)]
pub enum MaterialScope<'a> {
    Class(&'a str),
    Teacher(&'a str),
}

impl MaterialScope<'_> {
    fn clause(&self) -> (&'static str, &str) {
        match self {
            MaterialScope::Class(class) => ("class = ?", *class),
            MaterialScope::Teacher(teacher_id) => ("teacher_id = ?", *teacher_id),
        }
    }
}

impl Repository {
    // ==================== NOTES ====================

    /// Notes for a class or by a teacher, newest first.
    pub async fn list_notes(&self, scope: MaterialScope<'_>) -> Result<Vec<Note>, AppError> {
        let (clause, value) = scope.clause();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes WHERE {} ORDER BY upload_date DESC",
            NOTE_COLUMNS, clause
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    /// Get a note by ID.
    pub async fn get_note(&self, id: &str) -> Result<Option<Note>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    /// Record an uploaded note.
    pub async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO notes (id, title, subject, class, description, file_name, file_path, teacher_id, teacher_name, upload_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&note.title)
        .bind(&note.subject)
        .bind(&note.class)
        .bind(&note.description)
        .bind(&note.file_name)
        .bind(&note.file_path)
        .bind(&note.teacher_id)
        .bind(&note.teacher_name)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Note {
            id,
            title: note.title.clone(),
            subject: note.subject.clone(),
            class: note.class.clone(),
            description: note.description.clone(),
            file_name: note.file_name.clone(),
            file_path: note.file_path.clone(),
            teacher_id: note.teacher_id.clone(),
            teacher_name: note.teacher_name.clone(),
            upload_date: now,
        })
    }

    /// Delete a note owned by `teacher_id`. Returns `false` when no such note exists.
    pub async fn delete_note(&self, id: &str, teacher_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND teacher_id = ?")
            .bind(id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== SYLLABI ====================

    /// Syllabi for a class or by a teacher, newest first.
    pub async fn list_syllabi(&self, scope: MaterialScope<'_>) -> Result<Vec<Syllabus>, AppError> {
        let (clause, value) = scope.clause();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM syllabi WHERE {} ORDER BY upload_date DESC",
            SYLLABUS_COLUMNS, clause
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(syllabus_from_row).collect())
    }

    /// Get a syllabus by ID.
    pub async fn get_syllabus(&self, id: &str) -> Result<Option<Syllabus>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM syllabi WHERE id = ?", SYLLABUS_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(syllabus_from_row))
    }

    /// Record an uploaded syllabus.
    pub async fn create_syllabus(&self, syllabus: &NewSyllabus) -> Result<Syllabus, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO syllabi (id, subject, course_code, credits, class, description, units, reference_books, file_name, file_path, teacher_id, teacher_name, upload_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&syllabus.subject)
        .bind(&syllabus.course_code)
        .bind(syllabus.credits)
        .bind(&syllabus.class)
        .bind(&syllabus.description)
        .bind(to_json_array(&syllabus.units))
        .bind(to_json_array(&syllabus.reference_books))
        .bind(&syllabus.file_name)
        .bind(&syllabus.file_path)
        .bind(&syllabus.teacher_id)
        .bind(&syllabus.teacher_name)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Syllabus {
            id,
            subject: syllabus.subject.clone(),
            course_code: syllabus.course_code.clone(),
            credits: syllabus.credits,
            class: syllabus.class.clone(),
            description: syllabus.description.clone(),
            units: syllabus.units.clone(),
            reference_books: syllabus.reference_books.clone(),
            file_name: syllabus.file_name.clone(),
            file_path: syllabus.file_path.clone(),
            teacher_id: syllabus.teacher_id.clone(),
            teacher_name: syllabus.teacher_name.clone(),
            upload_date: now,
        })
    }

    /// Delete a syllabus owned by `teacher_id`. Returns `false` when no such syllabus exists.
    pub async fn delete_syllabus(&self, id: &str, teacher_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM syllabi WHERE id = ? AND teacher_id = ?")
            .bind(id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Helper functions for row conversion

fn note_from_row(row: &SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        subject: row.get("subject"),
        class: row.get("class"),
        description: row.get("description"),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        teacher_id: row.get("teacher_id"),
        teacher_name: row.get("teacher_name"),
        upload_date: row.get("upload_date"),
    }
}

fn syllabus_from_row(row: &SqliteRow) -> Syllabus {
    Syllabus {
        id: row.get("id"),
        subject: row.get("subject"),
        course_code: row.get("course_code"),
        credits: row.get("credits"),
        class: row.get("class"),
        description: row.get("description"),
        units: parse_json_array(row.get("units")),
        reference_books: parse_json_array(row.get("reference_books")),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        teacher_id: row.get("teacher_id"),
        teacher_name: row.get("teacher_name"),
        upload_date: row.get("upload_date"),
    }
}
