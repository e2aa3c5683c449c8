//! Admin account management: all users, faculty and students.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{done, require_fields, success, ApiResult};
use crate::auth::{hash_password, Principal};
use crate::errors::AppError;
use crate::models::{
    non_blank, normalize_list, AssignTeacherRequest, CreateStudentRequest, CreateTeacherRequest,
    CreateUserRequest, NewUser, Role, RoleProfile, StudentFilter, StudentUpdate,
    UpdateStudentRequest, UpdateUserRequest, User, UserFilter, UserUpdate,
};
use crate::AppState;

/// Hash an optional replacement password, ignoring blanks.
async fn optional_hash(password: Option<&str>) -> Result<Option<String>, AppError> {
    match password.filter(|p| !p.is_empty()) {
        Some(password) => Ok(Some(hash_password(password).await?)),
        None => Ok(None),
    }
}

// ==================== USERS ====================

/// GET /admin/users - List users, optionally by role and search text.
pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<User>> {
    principal.require(Role::Admin)?;

    let role = match non_blank(filter.role.as_deref()) {
        Some(raw) => Some(
            Role::parse(&raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", raw)))?,
        ),
        None => None,
    };

    let mut users = state.repo.list_users(role).await?;
    if let Some(q) = non_blank(filter.q.as_deref()) {
        users.retain(|u| u.matches_query(&q));
    }
    success(users)
}

/// POST /admin/users - Create an account of any role.
pub async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;
    require_fields(
        &[
            &request.username,
            &request.password,
            &request.role,
            &request.name,
        ],
        "Username, password, role and name are required",
    )?;

    let profile = match Role::parse(&request.role) {
        Some(Role::Admin) => RoleProfile::Admin,
        Some(Role::Teacher) => RoleProfile::Teacher {
            subjects: Vec::new(),
            classes: Vec::new(),
        },
        Some(Role::Student) => RoleProfile::Student {
            class: String::new(),
            roll_number: None,
        },
        None => {
            return Err(AppError::Validation(format!(
                "Unknown role: {}",
                request.role
            )))
        }
    };

    let user = state
        .repo
        .create_user(&NewUser {
            username: request.username.trim().to_string(),
            password_hash: hash_password(&request.password).await?,
            name: request.name.trim().to_string(),
            email: non_blank(request.email.as_deref()),
            profile,
        })
        .await?;

    done(user, "User created successfully")
}

/// POST /admin/users/{id}/edit - Edit an account, possibly changing its role.
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;

    let current = state
        .repo
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let current_role = current.role();
    let role = match non_blank(request.role.as_deref()) {
        Some(raw) => Role::parse(&raw)
            .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", raw)))?,
        None => current_role,
    };
    let name = non_blank(Some(request.name.as_str())).unwrap_or(current.name);
    // An omitted email keeps the stored one; an explicit blank clears it.
    let email = match request.email.as_deref() {
        Some(raw) => non_blank(Some(raw)),
        None => current.email,
    };

    if role != current_role {
        tracing::info!("Moving user {} from {} to {}", id, current_role, role);
    }

    let user = state
        .repo
        .update_user(
            &id,
            &UserUpdate {
                name,
                email,
                role,
                password_hash: optional_hash(request.password.as_deref()).await?,
            },
        )
        .await?;

    done(user, "User updated successfully")
}

/// POST /admin/users/{id}/delete - Delete an account other than the caller's.
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let admin = principal.require(Role::Admin)?;
    if admin.id == id {
        return Err(AppError::Validation("Cannot delete current admin".to_string()));
    }

    state.repo.delete_user(&id, None).await?;
    done((), "User deleted successfully")
}

// ==================== FACULTY ====================

/// GET /admin/faculty - List teachers.
pub async fn list_faculty(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Vec<User>> {
    principal.require(Role::Admin)?;
    success(state.repo.list_users(Some(Role::Teacher)).await?)
}

/// POST /admin/faculty - Create a teacher.
pub async fn create_teacher(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateTeacherRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;
    require_fields(
        &[&request.username, &request.password, &request.name],
        "Username, password and name are required",
    )?;

    let user = state
        .repo
        .create_user(&NewUser {
            username: request.username.trim().to_string(),
            password_hash: hash_password(&request.password).await?,
            name: request.name.trim().to_string(),
            email: non_blank(request.email.as_deref()),
            profile: RoleProfile::Teacher {
                subjects: normalize_list(&request.subjects),
                classes: normalize_list(&request.classes),
            },
        })
        .await?;

    done(user, "Faculty created successfully")
}

/// POST /admin/faculty/{id}/assign - Replace a teacher's subjects and classes.
pub async fn assign_teacher(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<AssignTeacherRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;

    let user = state
        .repo
        .assign_teacher(
            &id,
            &normalize_list(&request.subjects),
            &normalize_list(&request.classes),
        )
        .await?;

    done(user, "Assignments updated")
}

// ==================== STUDENTS ====================

/// GET /admin/students - List students, optionally of one class.
pub async fn list_students(
    State(state): State<AppState>,
    principal: Principal,
    Query(filter): Query<StudentFilter>,
) -> ApiResult<Vec<User>> {
    principal.require(Role::Admin)?;
    let class = non_blank(filter.class.as_deref());
    success(state.repo.list_students(class.as_deref()).await?)
}

/// POST /admin/students - Create a student.
pub async fn create_student(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateStudentRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;
    require_fields(
        &[
            &request.username,
            &request.password,
            &request.name,
            &request.class,
        ],
        "Username, password, name and class are required",
    )?;

    let user = state
        .repo
        .create_user(&NewUser {
            username: request.username.trim().to_string(),
            password_hash: hash_password(&request.password).await?,
            name: request.name.trim().to_string(),
            email: non_blank(request.email.as_deref()),
            profile: RoleProfile::Student {
                class: request.class.trim().to_string(),
                roll_number: non_blank(request.roll_number.as_deref()),
            },
        })
        .await?;

    done(user, "Student created successfully")
}

/// POST /admin/students/{id}/edit - Edit a student.
pub async fn update_student(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(request): Json<UpdateStudentRequest>,
) -> ApiResult<User> {
    principal.require(Role::Admin)?;
    require_fields(&[&request.name, &request.class], "Name and class are required")?;

    let user = state
        .repo
        .update_student(
            &id,
            &StudentUpdate {
                name: request.name.trim().to_string(),
                email: non_blank(request.email.as_deref()),
                class: request.class.trim().to_string(),
                roll_number: non_blank(request.roll_number.as_deref()),
                password_hash: optional_hash(request.password.as_deref()).await?,
            },
        )
        .await?;

    done(user, "Student updated successfully")
}

/// POST /admin/students/{id}/delete - Delete a student.
pub async fn delete_student(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<()> {
    principal.require(Role::Admin)?;
    state.repo.delete_user(&id, Some(Role::Student)).await?;
    done((), "Student deleted successfully")
}
