//! Admin endpoints for courses, class-sections and timetables.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use super::{done, require_fields, success, ApiResult};
use crate::auth::Principal;
use crate::errors::AppError;
use crate::models::{
    non_blank, normalize_list, overview_options, parse_credits, AddEntryRequest, ClassSection,
    Course, CourseFields, CreateClassRequest, CreateCourseRequest, DeleteEntryRequest, Role,
    SectionSelection, Timetable, TimetableEntry, TimetableOverview, UpdateCourseRequest,
    UpdateSlotsRequest, User,
};
use crate::AppState;

/// Course list with the teachers that can be assigned as instructors.
#[derive(Debug, Serialize)]
pub struct CourseCatalog {
    pub courses: Vec<Course>,
    pub teachers: Vec<User>,
}

// ==================== COURSES ====================

/// GET /admin/courses
pub async fn list_courses(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<CourseCatalog> {
    principal.require(Role::Admin)?;
    success(CourseCatalog {
        courses: state.repo.list_courses().await?,
        teachers: state.repo.list_users(Some(Role::Teacher)).await?,
    })
}

/// POST /admin/courses
pub async fn create_course(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    principal.require(Role::Admin)?;
    let missing = "Code, name, department, credits and semester are required";
    require_fields(
        &[
            &request.code,
            &request.name,
            &request.department,
            &request.semester,
        ],
        missing,
    )?;

    let credits = parse_credits(request.credits.as_ref())?
        .ok_or_else(|| AppError::Validation(missing.to_string()))?;

    let course = state
        .repo
        .create_course(
            request.code.trim(),
            &CourseFields {
                name: request.name.trim().to_string(),
                department: request.department.trim().to_string(),
                credits: Some(credits),
                semester: request.semester.trim().to_string(),
                description: non_blank(request.description.as_deref()),
                instructors: normalize_list(&request.instructors),
            },
        )
        .await?;

    done(course, "Course created successfully")
}

/// POST /admin/courses/{id}/edit - Blank credits keep the stored value.
pub async fn update_course(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    principal.require(Role::Admin)?;
    require_fields(
        &[&request.name, &request.department, &request.semester],
        "Name, department and semester are required",
    )?;

    let course = state
        .repo
        .update_course(
            &id,
            &CourseFields {
                name: request.name.trim().to_string(),
                department: request.department.trim().to_string(),
                credits: parse_credits(request.credits.as_ref())?,
                semester: request.semester.trim().to_string(),
                description: non_blank(request.description.as_deref()),
                instructors: normalize_list(&request.instructors),
            },
        )
        .await?;

    done(course, "Course updated successfully")
}

/// POST /admin/courses/{id}/delete
pub async fn delete_course(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    principal.require(Role::Admin)?;
    state.repo.delete_course(&id).await?;
    done((), "Course deleted successfully")
}

// ==================== CLASSES ====================

/// GET /admin/classes
pub async fn list_classes(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<ClassSection>> {
    principal.require(Role::Admin)?;
    success(state.repo.list_classes().await?)
}

/// POST /admin/classes
pub async fn create_class(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateClassRequest>,
) -> ApiResult<ClassSection> {
    principal.require(Role::Admin)?;
    require_fields(&[&request.division], "Division is required")?;

    let class = state
        .repo
        .create_class(
            request.division.trim(),
            request.department.trim(),
            request.year.trim(),
        )
        .await?;

    tracing::info!("Created class {}", class.label());
    done(class, "Class created successfully")
}

/// POST /admin/classes/{id}/delete
pub async fn delete_class(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    principal.require(Role::Admin)?;
    state.repo.delete_class(&id).await?;
    done((), "Class deleted successfully")
}

// ==================== TIMETABLE ====================

fn require_section(section: &SectionSelection) -> Result<String, AppError> {
    if !section.is_complete() {
        return Err(AppError::Validation(
            "Please select department, year and division".to_string(),
        ));
    }
    Ok(section.label())
}

/// GET /admin/timetable - Filter options plus the selected section's timetable.
pub async fn timetable_overview(
    State(state): State<AppState>,
    principal: Principal,
    Query(selection): Query<SectionSelection>,
) -> ApiResult<TimetableOverview> {
    principal.require(Role::Admin)?;

    let classes = state.repo.list_classes().await?;
    let (departments, years, divisions) = overview_options(&classes, &selection);

    let timetable = if selection.is_complete() {
        state.repo.get_timetable(&selection.label()).await?
    } else {
        None
    };

    success(TimetableOverview {
        departments,
        years,
        divisions,
        selected_department: selection.department.trim().to_string(),
        selected_year: selection.year.trim().to_string(),
        selected_division: selection.division.trim().to_string(),
        timetable,
    })
}

/// POST /admin/timetable/slots - Replace the time slots.
pub async fn update_time_slots(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<UpdateSlotsRequest>,
) -> ApiResult<Timetable> {
    principal.require(Role::Admin)?;
    let label = require_section(&request.section)?;

    let timetable = state
        .repo
        .set_time_slots(&label, &normalize_list(&request.time_slots))
        .await?;

    done(timetable, "Time slots updated")
}

/// POST /admin/timetable/entries - Append an entry.
pub async fn add_timetable_entry(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddEntryRequest>,
) -> ApiResult<Timetable> {
    principal.require(Role::Admin)?;
    let label = require_section(&request.section)?;
    require_fields(
        &[&request.day, &request.time_slot, &request.subject],
        "Missing required fields",
    )?;

    let entry = TimetableEntry {
        day: request.day.trim().to_string(),
        time_slot: request.time_slot.trim().to_string(),
        subject: request.subject.trim().to_string(),
        teacher: request.teacher.trim().to_string(),
        room: request.room.trim().to_string(),
    };

    let timetable = state.repo.add_timetable_entry(&label, &entry).await?;
    done(timetable, "Entry added")
}

/// POST /admin/timetable/entries/delete - Remove the entry at `index`.
pub async fn delete_timetable_entry(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<DeleteEntryRequest>,
) -> ApiResult<Timetable> {
    principal.require(Role::Admin)?;
    let label = require_section(&request.section)?;

    let timetable = state
        .repo
        .delete_timetable_entry(&label, request.index)
        .await?;

    done(timetable, "Entry deleted")
}
