//! Attendance and grade records, plus the attendance summary.

use serde::{Deserialize, Serialize};

/// One attendance mark for a (student, date, subject).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub class: String,
    pub date: String,
    pub subject: String,
    /// `true` when present
    pub status: bool,
    pub marked_by: String,
    pub updated_at: String,
}

/// Request body for `POST /api/attendance/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceUpdateRequest {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(default, alias = "student_id")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub status: bool,
}

/// One mark for a (student, subject, exam type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: String,
    pub student_id: String,
    pub class: String,
    pub subject: String,
    pub exam_type: String,
    pub marks: f64,
    pub teacher_id: String,
    pub updated_at: String,
}

/// Request body for `POST /api/grades/update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesUpdateRequest {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "exam_type")]
    pub exam_type: String,
    #[serde(default)]
    pub grades: Vec<GradeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    #[serde(default, alias = "student_id")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub marks: Option<f64>,
}

/// Result of a batch upsert.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub written: usize,
    pub skipped: usize,
}

/// Attendance of one subject.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubjectAttendance {
    pub name: String,
    pub present: u32,
    pub total: u32,
    pub percentage: f64,
}

/// Per-subject and overall attendance of one student.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub subjects: Vec<SubjectAttendance>,
    pub present: u32,
    pub total: u32,
    pub overall_percentage: f64,
}

/// Student attendance screen.
#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendance {
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

/// `present / total * 100`, one decimal; 0.0 when there is nothing to count.
pub fn percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(present) / f64::from(total) * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Group records by subject, keeping first-seen subject order.
pub fn summarize(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut subjects: Vec<SubjectAttendance> = Vec::new();
    let mut present = 0;
    let mut total = 0;

    for record in records {
        let idx = match subjects.iter().position(|s| s.name == record.subject) {
            Some(idx) => idx,
            None => {
                subjects.push(SubjectAttendance {
                    name: record.subject.clone(),
                    present: 0,
                    total: 0,
                    percentage: 0.0,
                });
                subjects.len() - 1
            }
        };

        subjects[idx].total += 1;
        total += 1;
        if record.status {
            subjects[idx].present += 1;
            present += 1;
        }
    }

    for subject in &mut subjects {
        subject.percentage = percentage(subject.present, subject.total);
    }

    AttendanceSummary {
        subjects,
        present,
        total,
        overall_percentage: percentage(present, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, status: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: "s1".to_string(),
            class: "3A".to_string(),
            date: "2024-03-01".to_string(),
            subject: subject.to_string(),
            status,
            marked_by: "t1".to_string(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_three_of_ten_is_thirty_percent() {
        let mut records: Vec<_> = (0..3).map(|_| record("Mathematics", true)).collect();
        records.extend((0..7).map(|_| record("Mathematics", false)));

        let summary = summarize(&records);
        assert_eq!(summary.subjects.len(), 1);
        assert_eq!(summary.subjects[0].percentage, 30.0);
        assert_eq!(summary.overall_percentage, 30.0);
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        assert_eq!(percentage(3, 7), 42.9);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(1, 1), 100.0);
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        let summary = summarize(&[]);
        assert!(summary.subjects.is_empty());
        assert_eq!(summary.overall_percentage, 0.0);
    }

    #[test]
    fn test_subjects_keep_first_seen_order() {
        let records = vec![
            record("Physics", true),
            record("Mathematics", false),
            record("Physics", false),
        ];
        let summary = summarize(&records);

        let names: Vec<_> = summary.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Physics", "Mathematics"]);
        assert_eq!(summary.subjects[0].percentage, 50.0);
        assert_eq!(summary.subjects[1].percentage, 0.0);
        assert_eq!(summary.overall_percentage, 33.3);
    }
}
