//! Teacher endpoints: dashboard, uploads, grading and the roster API.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use super::{done, require_fields, success, ApiResult};
use crate::auth::Principal;
use crate::db::{AttendanceMark, GradeMark, MaterialScope};
use crate::errors::AppError;
use crate::models::{
    non_blank, recent_activities, split_list, AttendanceUpdateRequest, GradesUpdateRequest,
    NewNote, NewSyllabus, Note, Role, RoleProfile, StudentSummary, Syllabus, TeacherDashboard,
    TeacherProfileRequest, TeachingLoad, UpsertOutcome, User,
};
use crate::storage::UploadKind;
use crate::AppState;

const DASHBOARD_ITEMS: usize = 5;

/// Text fields and the file part of a multipart upload form.
#[derive(Debug, Default)]
struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<(String, Vec<u8>)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    if !file_name.is_empty() {
                        form.file = Some((file_name, bytes.to_vec()));
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value.trim().to_string());
                }
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }
}

// ==================== DASHBOARD ====================

/// GET /dashboard/teacher
pub async fn teacher_dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<TeacherDashboard> {
    let teacher = principal.require(Role::Teacher)?;
    let now = Utc::now();

    let notifications = state
        .repo
        .list_notifications()
        .await?
        .into_iter()
        .filter(|n| n.visible_to_teacher(teacher.teacher_classes(), now))
        .take(DASHBOARD_ITEMS)
        .collect();

    let notes = state.repo.list_notes(MaterialScope::Teacher(&teacher.id)).await?;
    let syllabi = state
        .repo
        .list_syllabi(MaterialScope::Teacher(&teacher.id))
        .await?;

    success(TeacherDashboard {
        user: teacher.clone(),
        notifications,
        notes_count: notes.len() as i64,
        syllabus_count: syllabi.len() as i64,
        activities: recent_activities(&notes, &syllabi, DASHBOARD_ITEMS),
    })
}

// ==================== NOTES ====================

/// GET /teacher/notes - The caller's notes.
pub async fn list_teacher_notes(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Note>> {
    let teacher = principal.require(Role::Teacher)?;
    success(state.repo.list_notes(MaterialScope::Teacher(&teacher.id)).await?)
}

/// POST /teacher/notes and POST /api/notes/upload - Upload a note file.
pub async fn upload_note(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> ApiResult<Note> {
    let teacher = principal.require(Role::Teacher)?;
    let form = UploadForm::read(multipart).await?;

    require_fields(
        &[form.text("subject"), form.text("class"), form.text("description")],
        "All fields are required",
    )?;
    let (original_name, bytes) = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let stored = state.uploads.save(UploadKind::Note, original_name, bytes).await?;

    let note = state
        .repo
        .create_note(&NewNote {
            title: non_blank(Some(form.text("title"))),
            subject: form.text("subject").to_string(),
            class: form.text("class").to_string(),
            description: form.text("description").to_string(),
            file_name: stored.file_name,
            file_path: stored.file_path,
            teacher_id: teacher.id.clone(),
            teacher_name: teacher.name.clone(),
        })
        .await?;

    tracing::info!("{} uploaded note {} for {}", teacher.username, note.id, note.class);
    done(note, "Note uploaded successfully")
}

/// POST /teacher/notes/{id}/delete - Delete one of the caller's notes.
pub async fn delete_note(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let teacher = principal.require(Role::Teacher)?;

    if !state.repo.delete_note(&id, &teacher.id).await? {
        return Err(AppError::NotFound(
            "Note not found or you do not have permission to delete it".to_string(),
        ));
    }
    done((), "Note deleted successfully")
}

// ==================== SYLLABUS ====================

/// GET /teacher/syllabus - The caller's syllabi.
pub async fn list_teacher_syllabi(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<Syllabus>> {
    let teacher = principal.require(Role::Teacher)?;
    success(
        state
            .repo
            .list_syllabi(MaterialScope::Teacher(&teacher.id))
            .await?,
    )
}

/// POST /teacher/syllabus - Upload a syllabus file.
pub async fn upload_syllabus(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> ApiResult<Syllabus> {
    let teacher = principal.require(Role::Teacher)?;
    let form = UploadForm::read(multipart).await?;

    require_fields(
        &[
            form.text("subject"),
            form.text("course_code"),
            form.text("credits"),
            form.text("class"),
            form.text("description"),
            form.text("units"),
            form.text("reference_books"),
        ],
        "All fields are required",
    )?;
    let credits: i64 = form
        .text("credits")
        .parse()
        .map_err(|_| AppError::Validation("Credits must be a whole number".to_string()))?;
    let (original_name, bytes) = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let stored = state
        .uploads
        .save(UploadKind::Syllabus, original_name, bytes)
        .await?;

    let syllabus = state
        .repo
        .create_syllabus(&NewSyllabus {
            subject: form.text("subject").to_string(),
            course_code: form.text("course_code").to_string(),
            credits,
            class: form.text("class").to_string(),
            description: form.text("description").to_string(),
            units: split_list(form.text("units")),
            reference_books: split_list(form.text("reference_books")),
            file_name: stored.file_name,
            file_path: stored.file_path,
            teacher_id: teacher.id.clone(),
            teacher_name: teacher.name.clone(),
        })
        .await?;

    tracing::info!(
        "{} uploaded syllabus {} for {}",
        teacher.username,
        syllabus.id,
        syllabus.class
    );
    done(syllabus, "Syllabus uploaded successfully")
}

/// POST /teacher/syllabus/{id}/delete - Delete one of the caller's syllabi.
pub async fn delete_syllabus(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let teacher = principal.require(Role::Teacher)?;

    if !state.repo.delete_syllabus(&id, &teacher.id).await? {
        return Err(AppError::NotFound(
            "Syllabus not found or you do not have permission to delete it".to_string(),
        ));
    }
    done((), "Syllabus deleted successfully")
}

// ==================== GRADING & PROFILE ====================

/// GET /teacher/grades - Subjects and classes the caller grades.
pub async fn teaching_load(principal: Principal) -> ApiResult<TeachingLoad> {
    let teacher = principal.require(Role::Teacher)?;
    success(TeachingLoad {
        subjects: teacher.teacher_subjects().to_vec(),
        classes: teacher.teacher_classes().to_vec(),
    })
}

/// GET /teacher/profile
pub async fn teacher_profile(principal: Principal) -> ApiResult<User> {
    let teacher = principal.require(Role::Teacher)?;
    success(teacher.clone())
}

/// POST /teacher/profile - Update contact details.
pub async fn update_teacher_profile(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<TeacherProfileRequest>,
) -> ApiResult<User> {
    let teacher = principal.require(Role::Teacher)?;

    let contact = TeacherProfileRequest {
        phone: non_blank(request.phone.as_deref()),
        address: non_blank(request.address.as_deref()),
        city: non_blank(request.city.as_deref()),
        state: non_blank(request.state.as_deref()),
        postal_code: non_blank(request.postal_code.as_deref()),
    };

    done(
        state.repo.update_teacher_contact(&teacher.id, &contact).await?,
        "Profile updated successfully",
    )
}

// ==================== ROSTER & RECORDS API ====================

/// Students of one class.
#[derive(Debug, Serialize)]
pub struct Roster {
    pub students: Vec<StudentSummary>,
}

/// GET /api/students/{class}
pub async fn class_roster(
    State(state): State<AppState>,
    principal: Principal,
    Path(class): Path<String>,
) -> ApiResult<Roster> {
    principal.require(Role::Teacher)?;

    let students = state
        .repo
        .list_students(Some(&class))
        .await?
        .into_iter()
        .map(|student| StudentSummary {
            roll_number: match student.profile {
                RoleProfile::Student { roll_number, .. } => roll_number,
                _ => None,
            },
            id: student.id,
            name: student.name,
        })
        .collect();

    success(Roster { students })
}

/// POST /api/attendance/update - Upsert a class's attendance for one date and subject.
pub async fn update_attendance(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AttendanceUpdateRequest>,
) -> ApiResult<UpsertOutcome> {
    let teacher = principal.require(Role::Teacher)?;
    require_fields(
        &[&request.class, &request.date, &request.subject],
        "Missing required fields",
    )?;
    if request.attendance.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let marks: Vec<AttendanceMark<'_>> = request
        .attendance
        .iter()
        .filter_map(|entry| {
            entry
                .student_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(|student_id| AttendanceMark {
                    student_id,
                    status: entry.status,
                })
        })
        .collect();

    let written = state
        .repo
        .upsert_attendance(
            request.class.trim(),
            request.date.trim(),
            request.subject.trim(),
            &teacher.id,
            &marks,
        )
        .await?;

    tracing::info!(
        "{} recorded attendance for {} on {} ({} students)",
        teacher.username,
        request.class,
        request.date,
        written
    );

    done(
        UpsertOutcome {
            written,
            skipped: request.attendance.len() - written,
        },
        "Attendance updated successfully",
    )
}

/// POST /api/grades/update - Upsert marks for one subject and exam type.
pub async fn update_grades(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<GradesUpdateRequest>,
) -> ApiResult<UpsertOutcome> {
    let teacher = principal.require(Role::Teacher)?;
    require_fields(
        &[&request.class, &request.subject, &request.exam_type],
        "Missing required fields",
    )?;
    if request.grades.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let marks: Vec<GradeMark<'_>> = request
        .grades
        .iter()
        .filter_map(|entry| {
            let student_id = entry.student_id.as_deref().filter(|id| !id.is_empty())?;
            let marks = entry.marks?;
            Some(GradeMark { student_id, marks })
        })
        .collect();

    let written = state
        .repo
        .upsert_grades(
            request.class.trim(),
            request.subject.trim(),
            request.exam_type.trim(),
            &teacher.id,
            &marks,
        )
        .await?;

    tracing::info!(
        "{} recorded {} marks for {} ({} students)",
        teacher.username,
        request.exam_type,
        request.class,
        written
    );

    done(
        UpsertOutcome {
            written,
            skipped: request.grades.len() - written,
        },
        "Grades updated successfully",
    )
}
