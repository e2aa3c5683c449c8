//! Course catalogue model.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A course offered by a department.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub department: String,
    pub credits: i64,
    pub semester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User ids of the teaching staff
    pub instructors: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a course.
///
/// `credits` accepts either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub credits: Option<serde_json::Value>,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructors: Vec<String>,
}

/// Request body for editing a course. Blank credits keep the stored value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub credits: Option<serde_json::Value>,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructors: Vec<String>,
}

/// A validated course ready to be stored.
#[derive(Debug, Clone)]
pub struct CourseFields {
    pub name: String,
    pub department: String,
    pub credits: Option<i64>,
    pub semester: String,
    pub description: Option<String>,
    pub instructors: Vec<String>,
}

/// Parse a credits field. `Ok(None)` means the field was absent or blank.
pub fn parse_credits(value: Option<&serde_json::Value>) -> Result<Option<i64>, AppError> {
    let invalid = || AppError::Validation("Credits must be a whole number".to_string());
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_credits_accepts_numbers_and_strings() {
        assert_eq!(parse_credits(Some(&json!(4))).unwrap(), Some(4));
        assert_eq!(parse_credits(Some(&json!(" 3 "))).unwrap(), Some(3));
        assert_eq!(parse_credits(Some(&json!(""))).unwrap(), None);
        assert_eq!(parse_credits(None).unwrap(), None);
    }

    #[test]
    fn test_parse_credits_rejects_garbage() {
        assert!(parse_credits(Some(&json!("four"))).is_err());
        assert!(parse_credits(Some(&json!(2.5))).is_err());
        assert!(parse_credits(Some(&json!([1]))).is_err());
    }
}
