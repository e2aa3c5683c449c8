//! Session-based authentication module.
//!
//! Passwords are stored as Argon2id PHC strings. A login opens a session
//! whose opaque token is presented on later requests as a bearer token,
//! an `x-session-token` header or the `campus_session` cookie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Role, User};
use crate::AppState;

/// Header name for the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "campus_session";

/// Hash a password with Argon2id and a random salt.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Check a password against a stored hash. Malformed hashes never match.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || match PasswordHash::new(&stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))
}

/// Extract the session token from a request's headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim);

    let header_token = || {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };

    let cookie_token = || {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
    };

    bearer
        .or_else(header_token)
        .or_else(cookie_token)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `Set-Cookie` value storing a fresh session token.
pub fn session_cookie(token: &str, ttl_hours: i64) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl_hours * 3600
    ))
    .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("campus_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub token: String,
}

impl Principal {
    /// Fail with 403 unless the caller holds `role`.
    pub fn require(&self, role: Role) -> Result<&User, AppError> {
        self.require_any(&[role])
    }

    /// Fail with 403 unless the caller holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<&User, AppError> {
        let role = self.user.role();
        if roles.contains(&role) {
            Ok(&self.user)
        } else {
            tracing::debug!("Denied {} access to {}", role, self.user.username);
            Err(AppError::Forbidden(format!(
                "Access denied for role {}",
                role
            )))
        }
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;

        let user = state
            .repo
            .resolve_session(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(Principal { user, token })
    }
}

/// Request body for `POST /login/{role}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, value.parse().unwrap());
        }
        map
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("teacher123").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("teacher123", &hash).await.unwrap());
        assert!(!verify_password("teacher124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        assert!(!verify_password("admin123", "admin123").await.unwrap());
    }

    #[test]
    fn test_token_precedence() {
        let map = headers(&[
            ("authorization", "Bearer from-bearer"),
            ("x-session-token", "from-header"),
            ("cookie", "campus_session=from-cookie"),
        ]);
        assert_eq!(session_token(&map).as_deref(), Some("from-bearer"));

        let map = headers(&[
            ("x-session-token", "from-header"),
            ("cookie", "campus_session=from-cookie"),
        ]);
        assert_eq!(session_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_token_from_cookie() {
        let map = headers(&[("cookie", "theme=dark; campus_session=abc; lang=en")]);
        assert_eq!(session_token(&map).as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_token() {
        assert!(session_token(&HeaderMap::new()).is_none());
        let map = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(session_token(&map).is_none());
    }
}
