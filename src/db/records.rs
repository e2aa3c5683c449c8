//! Attendance and grade records.
//!
//! Both tables carry a UNIQUE index over their natural key, so a write is a
//! single `INSERT ... ON CONFLICT DO UPDATE` and concurrent writers cannot
//! produce duplicates.

use sqlx::{sqlite::SqliteRow, Row};

use super::{timestamp, Repository};
use crate::errors::AppError;
use crate::models::{AttendanceRecord, GradeRecord};

/// One attendance mark to write.
#[derive(Debug, Clone)]
pub struct AttendanceMark<'a> {
    pub student_id: &'a str,
    pub status: bool,
}

/// One grade to write.
#[derive(Debug, Clone)]
pub struct GradeMark<'a> {
    pub student_id: &'a str,
    pub marks: f64,
}

impl Repository {
    // ==================== ATTENDANCE ====================

    /// Upsert attendance for every mark, keyed on (student, date, subject).
    pub async fn upsert_attendance(
        &self,
        class: &str,
        date: &str,
        subject: &str,
        marked_by: &str,
        marks: &[AttendanceMark<'_>],
    ) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = timestamp();

        for mark in marks {
            sqlx::query(
                r#"
                INSERT INTO attendance (id, student_id, class, date, subject, status, marked_by, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(student_id, date, subject) DO UPDATE SET
                    status = excluded.status,
                    marked_by = excluded.marked_by,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(mark.student_id)
            .bind(class)
            .bind(date)
            .bind(subject)
            .bind(mark.status as i32)
            .bind(marked_by)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(marks.len())
    }

    /// All attendance of one student, oldest first.
    pub async fn list_attendance_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, student_id, class, date, subject, status, marked_by, updated_at FROM attendance WHERE student_id = ? ORDER BY date, subject",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(attendance_from_row).collect())
    }

    // ==================== GRADES ====================

    /// Upsert grades, keyed on (student, subject, exam type).
    pub async fn upsert_grades(
        &self,
        class: &str,
        subject: &str,
        exam_type: &str,
        teacher_id: &str,
        marks: &[GradeMark<'_>],
    ) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = timestamp();

        for mark in marks {
            sqlx::query(
                r#"
                INSERT INTO grades (id, student_id, class, subject, exam_type, marks, teacher_id, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(student_id, subject, exam_type) DO UPDATE SET
                    marks = excluded.marks,
                    teacher_id = excluded.teacher_id,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(mark.student_id)
            .bind(class)
            .bind(subject)
            .bind(exam_type)
            .bind(mark.marks)
            .bind(teacher_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(marks.len())
    }

    /// All grades of one student.
    pub async fn list_grades_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<GradeRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, student_id, class, subject, exam_type, marks, teacher_id, updated_at FROM grades WHERE student_id = ? ORDER BY subject, exam_type",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(grade_from_row).collect())
    }
}

// Helper functions for row conversion

fn attendance_from_row(row: &SqliteRow) -> AttendanceRecord {
    let status: i32 = row.get("status");
    AttendanceRecord {
        id: row.get("id"),
        student_id: row.get("student_id"),
        class: row.get("class"),
        date: row.get("date"),
        subject: row.get("subject"),
        status: status != 0,
        marked_by: row.get("marked_by"),
        updated_at: row.get("updated_at"),
    }
}

fn grade_from_row(row: &SqliteRow) -> GradeRecord {
    GradeRecord {
        id: row.get("id"),
        student_id: row.get("student_id"),
        class: row.get("class"),
        subject: row.get("subject"),
        exam_type: row.get("exam_type"),
        marks: row.get("marks"),
        teacher_id: row.get("teacher_id"),
        updated_at: row.get("updated_at"),
    }
}
