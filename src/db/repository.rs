//! Database repository: accounts, sessions and report counters.
//!
//! Course, timetable, record, notification and material operations live in
//! sibling modules as further `impl Repository` blocks.

use chrono::{Duration, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{format_timestamp, parse_json_array, timestamp, to_json_array, with_conflict_message};
use crate::errors::AppError;
use crate::models::{
    ContactDetails, NewUser, ReportStats, Role, RoleProfile, Session, StudentUpdate,
    TeacherProfileRequest, User, UserUpdate,
};

const USER_COLUMNS: &str = "id, username, role, name, email, phone, address, city, state, \
    postal_code, date_of_birth, class, roll_number, subjects, classes, created_at, updated_at";

const USERNAME_TAKEN: &str = "Username already exists";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// List users, admins first, then teachers, then students.
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let rows = match role {
            Some(role) => {
                sqlx::query(&format!(
                    "SELECT {} FROM users WHERE role = ? ORDER BY created_at, username",
                    USER_COLUMNS
                ))
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM users ORDER BY \
                     CASE role WHEN 'admin' THEN 0 WHEN 'teacher' THEN 1 ELSE 2 END, \
                     created_at, username",
                    USER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// List students, optionally restricted to one class.
    pub async fn list_students(&self, class: Option<&str>) -> Result<Vec<User>, AppError> {
        let rows = match class {
            Some(class) => {
                sqlx::query(&format!(
                    "SELECT {} FROM users WHERE role = 'student' AND class = ? \
                     ORDER BY roll_number, name",
                    USER_COLUMNS
                ))
                .bind(class)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM users WHERE role = 'student' ORDER BY created_at, username",
                    USER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Whether any account already uses `username`.
    pub async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Find a user of the given role by username, with its password hash.
    pub async fn find_login(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE username = ? AND role = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (user_from_row(&row), row.get("password_hash"))))
    }

    /// Password hash of a user, used to confirm password changes.
    pub async fn password_hash(&self, id: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("password_hash")))
    }

    /// Create a new user. The username must be unique across all roles.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        let (class, roll_number, subjects, classes) = match &new_user.profile {
            RoleProfile::Admin => (None, None, None, None),
            RoleProfile::Teacher { subjects, classes } => (
                None,
                None,
                Some(to_json_array(subjects)),
                Some(to_json_array(classes)),
            ),
            RoleProfile::Student { class, roll_number } => {
                (Some(class.clone()), roll_number.clone(), None, None)
            }
        };

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, role, name, email, class, roll_number, subjects, classes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.profile.role().as_str())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&class)
        .bind(&roll_number)
        .bind(&subjects)
        .bind(&classes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| with_conflict_message(e, USERNAME_TAKEN))?;

        tracing::info!(
            "Created {} account {} ({})",
            new_user.profile.role(),
            new_user.username,
            id
        );

        Ok(User {
            id,
            username: new_user.username.clone(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            contact: ContactDetails::default(),
            profile: new_user.profile.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Edit any account. A role change keeps every stored column, so
    /// role-specific data of the previous role survives a later switch back.
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User, AppError> {
        let now = timestamp();

        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, role = ?, password_hash = COALESCE(?, password_hash), updated_at = ? WHERE id = ?"
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(&update.password_hash)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Edit a student account.
    pub async fn update_student(
        &self,
        id: &str,
        update: &StudentUpdate,
    ) -> Result<User, AppError> {
        let now = timestamp();

        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, class = ?, roll_number = ?, password_hash = COALESCE(?, password_hash), updated_at = ? WHERE id = ? AND role = 'student'"
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.class)
        .bind(&update.roll_number)
        .bind(&update.password_hash)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Student not found".to_string()));
        }

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    /// Replace a teacher's subjects and classes.
    pub async fn assign_teacher(
        &self,
        id: &str,
        subjects: &[String],
        classes: &[String],
    ) -> Result<User, AppError> {
        let result = sqlx::query(
            "UPDATE users SET subjects = ?, classes = ?, updated_at = ? WHERE id = ? AND role = 'teacher'"
        )
        .bind(to_json_array(subjects))
        .bind(to_json_array(classes))
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Teacher not found".to_string()));
        }

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
    }

    /// Update the fields a student may change on their own account page.
    pub async fn update_student_account(
        &self,
        id: &str,
        email: Option<&str>,
        contact: &ContactDetails,
        password_hash: Option<&str>,
    ) -> Result<User, AppError> {
        sqlx::query(
            "UPDATE users SET email = ?, phone = ?, address = ?, date_of_birth = ?, password_hash = COALESCE(?, password_hash), updated_at = ? WHERE id = ?"
        )
        .bind(email)
        .bind(&contact.phone)
        .bind(&contact.address)
        .bind(&contact.date_of_birth)
        .bind(password_hash)
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update a teacher's own contact details.
    pub async fn update_teacher_contact(
        &self,
        id: &str,
        request: &TeacherProfileRequest,
    ) -> Result<User, AppError> {
        sqlx::query(
            "UPDATE users SET phone = ?, address = ?, city = ?, state = ?, postal_code = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.postal_code)
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Delete a user, optionally only when it holds `role`. Sessions cascade.
    pub async fn delete_user(&self, id: &str, role: Option<Role>) -> Result<(), AppError> {
        let result = match role {
            Some(role) => {
                sqlx::query("DELETE FROM users WHERE id = ? AND role = ?")
                    .bind(id)
                    .bind(role.as_str())
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM users WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    // ==================== SESSION OPERATIONS ====================

    /// Open a session for `user_id` valid for `ttl_hours`.
    pub async fn create_session(&self, user_id: &str, ttl_hours: i64) -> Result<Session, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = format_timestamp(now + Duration::hours(ttl_hours));

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(format_timestamp(now))
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            token,
            user_id: user_id.to_string(),
            expires_at,
        })
    }

    /// Resolve a session token to its user. Unknown or expired tokens yield `None`.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = (SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?)",
            USER_COLUMNS
        ))
        .bind(token)
        .bind(timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// End a session.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop sessions that have expired; returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ==================== REPORTS ====================

    /// Record counts for the admin reports page.
    pub async fn report_stats(&self) -> Result<ReportStats, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'student') AS students,
                (SELECT COUNT(*) FROM users WHERE role = 'teacher') AS teachers,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM courses) AS courses,
                (SELECT COUNT(*) FROM attendance) AS attendance,
                (SELECT COUNT(*) FROM grades) AS grades,
                (SELECT COUNT(*) FROM notes) AS notes,
                (SELECT COUNT(*) FROM syllabi) AS syllabus
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ReportStats {
            students: row.get("students"),
            teachers: row.get("teachers"),
            admins: row.get("admins"),
            courses: row.get("courses"),
            attendance: row.get("attendance"),
            grades: row.get("grades"),
            notes: row.get("notes"),
            syllabus: row.get("syllabus"),
        })
    }
}

// Helper functions for row conversion

fn user_from_row(row: &SqliteRow) -> User {
    let role: String = row.get("role");
    let profile = match Role::parse(&role) {
        Some(Role::Teacher) => RoleProfile::Teacher {
            subjects: parse_json_array(row.get("subjects")),
            classes: parse_json_array(row.get("classes")),
        },
        Some(Role::Student) => RoleProfile::Student {
            class: row.get::<Option<String>, _>("class").unwrap_or_default(),
            roll_number: row.get("roll_number"),
        },
        _ => RoleProfile::Admin,
    };

    User {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        email: row.get("email"),
        contact: ContactDetails {
            phone: row.get("phone"),
            address: row.get("address"),
            city: row.get("city"),
            state: row.get("state"),
            postal_code: row.get("postal_code"),
            date_of_birth: row.get("date_of_birth"),
        },
        profile,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
