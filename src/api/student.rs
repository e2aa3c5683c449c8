//! Student endpoints and material downloads.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{done, success, ApiResult};
use crate::auth::{hash_password, verify_password, Principal};
use crate::db::MaterialScope;
use crate::errors::AppError;
use crate::models::{
    non_blank, summarize, ContactDetails, Dashboard, GradeRecord, Note, Notification, Role,
    StudentAccountRequest, StudentAttendance, StudentTimetable, Syllabus, Timetable, User,
};
use crate::storage::Download;
use crate::AppState;

const DASHBOARD_ITEMS: usize = 5;

/// Notifications the student may see, newest first.
async fn visible_notifications(
    state: &AppState,
    student: &User,
) -> Result<Vec<Notification>, AppError> {
    let now = Utc::now();
    Ok(state
        .repo
        .list_notifications()
        .await?
        .into_iter()
        .filter(|n| n.visible_to_student(student.student_class(), now))
        .collect())
}

/// GET /dashboard/student
pub async fn student_dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Dashboard> {
    let student = principal.require(Role::Student)?;

    let mut notifications = visible_notifications(&state, student).await?;
    notifications.truncate(DASHBOARD_ITEMS);

    success(Dashboard {
        user: student.clone(),
        notifications,
    })
}

/// GET /student/notifications
pub async fn student_notifications(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Notification>> {
    let student = principal.require(Role::Student)?;
    success(visible_notifications(&state, student).await?)
}

/// GET /student/attendance - Records with per-subject and overall percentages.
pub async fn student_attendance(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<StudentAttendance> {
    let student = principal.require(Role::Student)?;

    let records = state.repo.list_attendance_for_student(&student.id).await?;
    let summary = summarize(&records);

    success(StudentAttendance { records, summary })
}

/// GET /student/grades
pub async fn student_grades(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<GradeRecord>> {
    let student = principal.require(Role::Student)?;
    success(state.repo.list_grades_for_student(&student.id).await?)
}

/// GET /student/notes - Notes for the student's class.
pub async fn student_notes(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Note>> {
    let student = principal.require(Role::Student)?;
    let class = student.student_class().unwrap_or_default();
    success(state.repo.list_notes(MaterialScope::Class(class)).await?)
}

/// GET /student/syllabus - Syllabi for the student's class.
pub async fn student_syllabus(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Syllabus>> {
    let student = principal.require(Role::Student)?;
    let class = student.student_class().unwrap_or_default();
    success(state.repo.list_syllabi(MaterialScope::Class(class)).await?)
}

/// GET /student/timetable - The class timetable and today's weekday.
pub async fn student_timetable(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<StudentTimetable> {
    let student = principal.require(Role::Student)?;
    let class = student.student_class().unwrap_or_default();

    let timetable = state
        .repo
        .get_timetable(class)
        .await?
        .unwrap_or_else(|| Timetable::empty(class));

    success(StudentTimetable {
        timetable,
        current_day: Utc::now().format("%A").to_string(),
    })
}

/// GET /student/account
pub async fn student_account(principal: Principal) -> ApiResult<User> {
    let student = principal.require(Role::Student)?;
    success(student.clone())
}

/// POST /student/account - Update contact details and optionally the password.
pub async fn update_student_account(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<StudentAccountRequest>,
) -> ApiResult<User> {
    let student = principal.require(Role::Student)?;

    let new_hash = match non_blank(request.new_password.as_deref()) {
        Some(new_password) => {
            let stored = state
                .repo
                .password_hash(&student.id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let current = request.current_password.as_deref().unwrap_or_default();
            if current.is_empty() || !verify_password(current, &stored).await? {
                return Err(AppError::Validation(
                    "Current password is incorrect".to_string(),
                ));
            }
            Some(hash_password(&new_password).await?)
        }
        None => None,
    };

    let contact = ContactDetails {
        phone: non_blank(request.phone.as_deref()),
        address: non_blank(request.address.as_deref()),
        date_of_birth: non_blank(request.date_of_birth.as_deref()),
        ..ContactDetails::default()
    };
    let email = non_blank(request.email.as_deref());

    let user = state
        .repo
        .update_student_account(&student.id, email.as_deref(), &contact, new_hash.as_deref())
        .await?;

    if new_hash.is_some() {
        tracing::info!("{} changed their password", student.username);
    }
    done(user, "Account information updated successfully")
}

// ==================== DOWNLOADS ====================

/// GET /download/note/{id}
pub async fn download_note(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Download, AppError> {
    principal.require(Role::Student)?;

    let note = state
        .repo
        .get_note(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    Ok(Download {
        bytes: state.uploads.read(&note.file_path).await?,
        file_name: note.file_name,
    })
}

/// GET /download/syllabus/{id}
pub async fn download_syllabus(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Download, AppError> {
    principal.require(Role::Student)?;

    let syllabus = state
        .repo
        .get_syllabus(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Syllabus not found".to_string()))?;

    Ok(Download {
        bytes: state.uploads.read(&syllabus.file_path).await?,
        file_name: syllabus.file_name,
    })
}
