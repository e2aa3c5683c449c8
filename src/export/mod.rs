//! CSV exports for the admin reports page.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::models::{ClassSection, Course, User};

/// Exportable record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Users,
    Courses,
    Classes,
}

impl ExportKind {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "users" => Ok(ExportKind::Users),
            "courses" => Ok(ExportKind::Courses),
            "classes" => Ok(ExportKind::Classes),
            other => Err(AppError::NotFound(format!("Unknown export: {}", other))),
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportKind::Users => "users.csv",
            ExportKind::Courses => "courses.csv",
            ExportKind::Classes => "classes.csv",
        }
    }
}

/// A rendered CSV document served as an attachment.
#[derive(Debug, Clone)]
pub struct CsvFile {
    pub file_name: &'static str,
    pub body: String,
}

impl IntoResponse for CsvFile {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", self.file_name),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

pub fn users_csv(users: &[User]) -> String {
    render(
        &["username", "name", "email", "role"],
        users.iter().map(|u| {
            vec![
                u.username.clone(),
                u.name.clone(),
                u.email.clone().unwrap_or_default(),
                u.role().to_string(),
            ]
        }),
    )
}

pub fn courses_csv(courses: &[Course]) -> String {
    render(
        &["code", "name", "department", "credits", "semester"],
        courses.iter().map(|c| {
            vec![
                c.code.clone(),
                c.name.clone(),
                c.department.clone(),
                c.credits.to_string(),
                c.semester.clone(),
            ]
        }),
    )
}

pub fn classes_csv(classes: &[ClassSection]) -> String {
    render(
        &["division", "department", "year"],
        classes
            .iter()
            .map(|c| vec![c.division.clone(), c.department.clone(), c.year.clone()]),
    )
}

fn render(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = String::new();
    push_row(&mut out, header.iter().copied());
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

/// Quote a field when it holds a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(division: &str, department: &str, year: &str) -> ClassSection {
        ClassSection {
            id: "c1".to_string(),
            division: division.to_string(),
            department: department.to_string(),
            year: year.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_classes_csv() {
        let csv = classes_csv(&[section("A", "ECE", "3rd Year"), section("B", "Arts, Design", "1st")]);
        assert_eq!(
            csv,
            "division,department,year\nA,ECE,3rd Year\nB,\"Arts, Design\",1st\n"
        );
    }

    #[test]
    fn test_export_kind_parse() {
        assert_eq!(ExportKind::parse("users").unwrap(), ExportKind::Users);
        assert_eq!(ExportKind::Courses.file_name(), "courses.csv");
        assert!(ExportKind::parse("grades").is_err());
    }
}
