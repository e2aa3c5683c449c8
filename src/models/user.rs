//! User accounts with a role-tagged profile.

use serde::{Deserialize, Serialize};

/// The three roles a campus account can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific part of a user, tagged by role.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Admin,
    Teacher {
        subjects: Vec<String>,
        classes: Vec<String>,
    },
    Student {
        class: String,
        #[serde(rename = "rollNumber", skip_serializing_if = "Option::is_none")]
        roll_number: Option<String>,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Admin => Role::Admin,
            RoleProfile::Teacher { .. } => Role::Teacher,
            RoleProfile::Student { .. } => Role::Student,
        }
    }
}

/// Optional contact fields filled in by users themselves.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// A campus account. The password hash never leaves the repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Class of a student, `None` for other roles.
    pub fn student_class(&self) -> Option<&str> {
        match &self.profile {
            RoleProfile::Student { class, .. } => Some(class.as_str()),
            _ => None,
        }
    }

    /// Subjects taught, empty for non-teachers.
    pub fn teacher_subjects(&self) -> &[String] {
        match &self.profile {
            RoleProfile::Teacher { subjects, .. } => subjects,
            _ => &[],
        }
    }

    /// Classes taught, empty for non-teachers.
    pub fn teacher_classes(&self) -> &[String] {
        match &self.profile {
            RoleProfile::Teacher { classes, .. } => classes,
            _ => &[],
        }
    }

    /// Text searched by the admin user filter.
    pub fn matches_query(&self, query: &str) -> bool {
        let haystack = format!(
            "{}{}{}",
            self.username,
            self.name,
            self.email.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        haystack.contains(&query.to_lowercase())
    }
}

/// A login session handed out to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: String,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub profile: RoleProfile,
}

/// Admin edit of any account, possibly changing its role.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub password_hash: Option<String>,
}

/// Admin edit of a student account.
#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub name: String,
    pub email: Option<String>,
    pub class: String,
    pub roll_number: Option<String>,
    pub password_hash: Option<String>,
}

/// Query string of the admin user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// Query string of the admin student list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    #[serde(default)]
    pub class: Option<String>,
}

/// Request body for creating an account of any role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for editing an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for creating a teacher.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Request body for replacing a teacher's subjects and classes.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignTeacherRequest {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Request body for creating a student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub roll_number: Option<String>,
}

/// Request body for editing a student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for a student's own account page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAccountRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Request body for a teacher's own profile page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfileRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Minimal student listing used by the teacher roster API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
}

/// Trim every item and drop the blank ones.
pub fn normalize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim an optional field, mapping blanks to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> User {
        User {
            id: "u1".to_string(),
            username: "student1".to_string(),
            name: "Student One".to_string(),
            email: Some("s1@college.edu".to_string()),
            contact: ContactDetails::default(),
            profile: RoleProfile::Student {
                class: "3rd Year - ECE A".to_string(),
                roll_number: Some("ECE/2023/001".to_string()),
            },
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
        }
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Admin, Role::Teacher, Role::Student] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("principal"), None);
    }

    #[test]
    fn test_profile_serializes_with_role_tag() {
        let json = serde_json::to_value(student()).unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["class"], "3rd Year - ECE A");
        assert_eq!(json["rollNumber"], "ECE/2023/001");
        assert_eq!(json["username"], "student1");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let user = student();
        assert!(user.matches_query("STUDENT"));
        assert!(user.matches_query("s1@college"));
        assert!(!user.matches_query("teacher"));
    }

    #[test]
    fn test_normalize_list_splits_and_trims() {
        let items = vec![
            "Mathematics, Physics".to_string(),
            "  ".to_string(),
            " Chemistry ".to_string(),
        ];
        assert_eq!(
            normalize_list(&items),
            vec!["Mathematics", "Physics", "Chemistry"]
        );
    }
}
