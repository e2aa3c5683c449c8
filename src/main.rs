//! Campus Administration Backend
//!
//! A role-based REST backend for admins, teachers and students with SQLite
//! persistence and on-disk storage for uploaded course material.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod export;
mod models;
mod seed;
mod storage;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use storage::UploadStore;

/// Largest accepted request body, sized for note and syllabus uploads.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub uploads: Arc<UploadStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus Administration Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Prepare upload storage
    let uploads = Arc::new(UploadStore::new(&config.upload_dir));
    tokio::fs::create_dir_all(uploads.root()).await?;

    if config.seed_defaults {
        seed::seed_defaults(&repo).await?;
    }

    let purged = repo.purge_expired_sessions().await?;
    if purged > 0 {
        tracing::info!("Removed {} expired sessions", purged);
    }

    // Create application state
    let state = AppState {
        repo,
        uploads,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes: Router<AppState> = Router::new()
        .route("/login/{role}", post(api::login))
        .route("/logout", post(api::logout))
        .route("/me", get(api::me));

    let admin_routes: Router<AppState> = Router::new()
        .route("/dashboard/admin", get(api::admin_dashboard))
        // Users
        .route("/admin/users", get(api::list_users).post(api::create_user))
        .route("/admin/users/{id}/edit", post(api::update_user))
        .route("/admin/users/{id}/delete", post(api::delete_user))
        // Faculty
        .route("/admin/faculty", get(api::list_faculty).post(api::create_teacher))
        .route("/admin/faculty/{id}/assign", post(api::assign_teacher))
        // Students
        .route(
            "/admin/students",
            get(api::list_students).post(api::create_student),
        )
        .route("/admin/students/{id}/edit", post(api::update_student))
        .route("/admin/students/{id}/delete", post(api::delete_student))
        // Courses
        .route("/admin/courses", get(api::list_courses).post(api::create_course))
        .route("/admin/courses/{id}/edit", post(api::update_course))
        .route("/admin/courses/{id}/delete", post(api::delete_course))
        // Classes
        .route("/admin/classes", get(api::list_classes).post(api::create_class))
        .route("/admin/classes/{id}/delete", post(api::delete_class))
        // Timetable
        .route("/admin/timetable", get(api::timetable_overview))
        .route("/admin/timetable/slots", post(api::update_time_slots))
        .route("/admin/timetable/entries", post(api::add_timetable_entry))
        .route(
            "/admin/timetable/entries/delete",
            post(api::delete_timetable_entry),
        )
        // Settings and reports
        .route(
            "/admin/settings",
            get(api::get_settings).post(api::update_settings),
        )
        .route("/admin/reports", get(api::reports))
        .route("/admin/reports/export/{kind}", get(api::export_report));

    let notification_routes: Router<AppState> = Router::new()
        .route(
            "/notifications/manage",
            get(api::list_notifications).post(api::create_notification),
        )
        .route("/notifications/{id}/edit", post(api::update_notification))
        .route("/notifications/{id}/delete", post(api::delete_notification));

    let teacher_routes: Router<AppState> = Router::new()
        .route("/dashboard/teacher", get(api::teacher_dashboard))
        .route(
            "/teacher/notes",
            get(api::list_teacher_notes).post(api::upload_note),
        )
        .route("/teacher/notes/{id}/delete", post(api::delete_note))
        .route(
            "/teacher/syllabus",
            get(api::list_teacher_syllabi).post(api::upload_syllabus),
        )
        .route("/teacher/syllabus/{id}/delete", post(api::delete_syllabus))
        .route("/teacher/grades", get(api::teaching_load))
        .route(
            "/teacher/profile",
            get(api::teacher_profile).post(api::update_teacher_profile),
        )
        // JSON API
        .route("/api/students/{class}", get(api::class_roster))
        .route("/api/attendance/update", post(api::update_attendance))
        .route("/api/grades/update", post(api::update_grades))
        .route("/api/notes/upload", post(api::upload_note));

    let student_routes: Router<AppState> = Router::new()
        .route("/dashboard/student", get(api::student_dashboard))
        .route("/student/notifications", get(api::student_notifications))
        .route("/student/attendance", get(api::student_attendance))
        .route("/student/grades", get(api::student_grades))
        .route("/student/notes", get(api::student_notes))
        .route("/student/syllabus", get(api::student_syllabus))
        .route("/student/timetable", get(api::student_timetable))
        .route(
            "/student/account",
            get(api::student_account).post(api::update_student_account),
        )
        .route("/download/note/{id}", get(api::download_note))
        .route("/download/syllabus/{id}", get(api::download_syllabus));

    // Health check (no auth required)
    let health_routes: Router<AppState> = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(notification_routes)
        .merge(teacher_routes)
        .merge(student_routes)
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
