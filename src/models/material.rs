//! Uploaded course material: notes and syllabi.

use serde::Serialize;

/// Lecture notes uploaded by a teacher for a class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub subject: String,
    pub class: String,
    pub description: String,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub upload_date: String,
}

/// A course syllabus uploaded by a teacher for a class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    pub id: String,
    pub subject: String,
    pub course_code: String,
    pub credits: i64,
    pub class: String,
    pub description: String,
    pub units: Vec<String>,
    pub reference_books: Vec<String>,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub upload_date: String,
}

/// Note metadata collected from an upload form.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: Option<String>,
    pub subject: String,
    pub class: String,
    pub description: String,
    pub file_name: String,
    pub file_path: String,
    pub teacher_id: String,
    pub teacher_name: String,
}

/// Syllabus metadata collected from an upload form.
#[derive(Debug, Clone)]
pub struct NewSyllabus {
    pub subject: String,
    pub course_code: String,
    pub credits: i64,
    pub class: String,
    pub description: String,
    pub units: Vec<String>,
    pub reference_books: Vec<String>,
    pub file_name: String,
    pub file_path: String,
    pub teacher_id: String,
    pub teacher_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Note,
    Syllabus,
}

/// An entry in the teacher's recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct UploadActivity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub subject: String,
    pub date: String,
    pub description: String,
}

impl From<&Note> for UploadActivity {
    fn from(note: &Note) -> Self {
        Self {
            kind: ActivityKind::Note,
            subject: note.subject.clone(),
            date: note.upload_date.clone(),
            description: format!("Uploaded notes for {}", note.subject),
        }
    }
}

impl From<&Syllabus> for UploadActivity {
    fn from(syllabus: &Syllabus) -> Self {
        Self {
            kind: ActivityKind::Syllabus,
            subject: syllabus.subject.clone(),
            date: syllabus.upload_date.clone(),
            description: format!("Uploaded syllabus for {}", syllabus.subject),
        }
    }
}

/// Merge notes and syllabi into one feed, newest first, capped at `limit`.
pub fn recent_activities(notes: &[Note], syllabi: &[Syllabus], limit: usize) -> Vec<UploadActivity> {
    let mut activities: Vec<UploadActivity> = notes
        .iter()
        .map(UploadActivity::from)
        .chain(syllabi.iter().map(UploadActivity::from))
        .collect();
    activities.sort_by(|a, b| b.date.cmp(&a.date));
    activities.truncate(limit);
    activities
}

/// Split a comma-separated form field, keeping blank-free trimmed items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(subject: &str, date: &str) -> Note {
        Note {
            id: subject.to_string(),
            title: None,
            subject: subject.to_string(),
            class: "3A".to_string(),
            description: String::new(),
            file_name: "n.pdf".to_string(),
            file_path: "/tmp/n.pdf".to_string(),
            teacher_id: "t1".to_string(),
            teacher_name: "John".to_string(),
            upload_date: date.to_string(),
        }
    }

    fn syllabus(subject: &str, date: &str) -> Syllabus {
        Syllabus {
            id: subject.to_string(),
            subject: subject.to_string(),
            course_code: "MA101".to_string(),
            credits: 4,
            class: "3A".to_string(),
            description: String::new(),
            units: vec![],
            reference_books: vec![],
            file_name: "s.pdf".to_string(),
            file_path: "/tmp/s.pdf".to_string(),
            teacher_id: "t1".to_string(),
            teacher_name: "John".to_string(),
            upload_date: date.to_string(),
        }
    }

    #[test]
    fn test_recent_activities_merge_and_cap() {
        let notes = vec![
            note("Algebra", "2024-01-03T00:00:00.000000Z"),
            note("Calculus", "2024-01-01T00:00:00.000000Z"),
        ];
        let syllabi = vec![syllabus("Physics", "2024-01-02T00:00:00.000000Z")];

        let activities = recent_activities(&notes, &syllabi, 2);
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].subject, "Algebra");
        assert_eq!(activities[1].kind, ActivityKind::Syllabus);
        assert_eq!(activities[1].description, "Uploaded syllabus for Physics");
    }

    #[test]
    fn test_file_path_is_not_serialized() {
        let json = serde_json::to_value(note("Algebra", "x")).unwrap();
        assert!(json.get("filePath").is_none());
        assert_eq!(json["fileName"], "n.pdf");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("Unit 1, Unit 2,, "), vec!["Unit 1", "Unit 2"]);
        assert!(split_list("").is_empty());
    }
}
