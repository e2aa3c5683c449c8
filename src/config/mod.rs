//! Configuration module for the campus backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Root directory for uploaded notes and syllabi
    pub upload_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
    /// Seed default accounts on startup when they are missing
    pub seed_defaults: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("CAMPUS_DB_PATH")
            .unwrap_or_else(|_| "./data/campus.sqlite".to_string())
            .into();

        let upload_dir = env::var("CAMPUS_UPLOAD_DIR")
            .unwrap_or_else(|_| "./uploads".to_string())
            .into();

        let bind_addr = env::var("CAMPUS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid CAMPUS_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("CAMPUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let session_ttl_hours = match env::var("CAMPUS_SESSION_TTL_HOURS") {
            Ok(raw) => raw.trim().parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                AppError::Internal(format!("Invalid CAMPUS_SESSION_TTL_HOURS: {}", raw))
            })?,
            Err(_) => 12,
        };

        let seed_defaults = env::var("CAMPUS_SEED_DEFAULTS")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            db_path,
            upload_dir,
            bind_addr,
            log_level,
            session_ttl_hours,
            seed_defaults,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Environment variables are process-wide.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 6] = [
        "CAMPUS_DB_PATH",
        "CAMPUS_UPLOAD_DIR",
        "CAMPUS_BIND_ADDR",
        "CAMPUS_LOG_LEVEL",
        "CAMPUS_SESSION_TTL_HOURS",
        "CAMPUS_SEED_DEFAULTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/campus.sqlite"));
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_ttl_hours, 12);
        assert!(config.seed_defaults);
    }

    #[test]
    fn test_invalid_ttl_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("CAMPUS_SESSION_TTL_HOURS", "soon");

        let result = Config::from_env();
        clear_env();

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_seed_flag_parsing() {
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
        assert!(parse_flag("true"));
        assert!(parse_flag("yes"));
    }
}
