//! Login, logout and the current-user endpoint.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use super::{done, success, ApiResponse, ApiResult};
use crate::auth::{
    clear_session_cookie, session_cookie, verify_password, LoginRequest, LoginResponse, Principal,
};
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::AppState;

/// POST /login/{role} - Open a session for a user of `role`.
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::NotFound(format!("Unknown role: {}", role)))?;
    let username = request.username.trim();
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let Some((user, hash)) = state.repo.find_login(username, role).await? else {
        tracing::warn!("Failed {} login for unknown user {}", role, username);
        return Err(invalid());
    };

    if !verify_password(&request.password, &hash).await? {
        tracing::warn!("Failed {} login for {}", role, username);
        return Err(invalid());
    }

    let ttl = state.config.session_ttl_hours;
    let session = state.repo.create_session(&user.id, ttl).await?;
    tracing::info!("{} {} logged in", role, user.username);

    let cookie = session_cookie(&session.token, ttl)?;
    let body = ApiResponse::new(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    })
    .with_message("Logged in successfully");

    Ok(([(header::SET_COOKIE, cookie)], body))
}

/// POST /logout - End the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    state.repo.delete_session(&principal.token).await?;
    tracing::info!("{} logged out", principal.user.username);

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        done((), "Logged out")?,
    ))
}

/// GET /me - The authenticated user.
pub async fn me(principal: Principal) -> ApiResult<User> {
    success(principal.user)
}
