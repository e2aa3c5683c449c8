//! Admin dashboard, site settings and reports.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{done, success, ApiResult};
use crate::auth::Principal;
use crate::errors::AppError;
use crate::export::{classes_csv, courses_csv, users_csv, CsvFile, ExportKind};
use crate::models::{ReportStats, Role, Settings, User};
use crate::AppState;

/// GET /dashboard/admin
pub async fn admin_dashboard(principal: Principal) -> ApiResult<User> {
    let admin = principal.require(Role::Admin)?;
    success(admin.clone())
}

/// GET /admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Settings> {
    principal.require(Role::Admin)?;
    success(state.repo.get_settings().await?)
}

/// POST /admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<Settings>,
) -> ApiResult<Settings> {
    principal.require(Role::Admin)?;

    let settings = Settings {
        site_name: request.site_name.trim().to_string(),
        registration_enabled: request.registration_enabled,
        backup_cron: request.backup_cron.trim().to_string(),
    };

    done(state.repo.save_settings(&settings).await?, "Settings updated")
}

/// GET /admin/reports - Record counts.
pub async fn reports(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ReportStats> {
    principal.require(Role::Admin)?;
    success(state.repo.report_stats().await?)
}

/// GET /admin/reports/export/{kind} - CSV download of users, courses or classes.
pub async fn export_report(
    State(state): State<AppState>,
    principal: Principal,
    Path(kind): Path<String>,
) -> Result<CsvFile, AppError> {
    principal.require(Role::Admin)?;
    let kind = ExportKind::parse(&kind)?;

    let body = match kind {
        ExportKind::Users => users_csv(&state.repo.list_users(None).await?),
        ExportKind::Courses => courses_csv(&state.repo.list_courses().await?),
        ExportKind::Classes => classes_csv(&state.repo.list_classes().await?),
    };

    tracing::info!("Exported {}", kind.file_name());
    Ok(CsvFile {
        file_name: kind.file_name(),
        body,
    })
}
