//! Class-sections and their weekly timetables.

use serde::{Deserialize, Serialize};

/// Slots shown for a class that has no timetable yet.
pub const DEFAULT_TIME_SLOTS: [&str; 7] = [
    "9:00 - 10:00",
    "10:00 - 11:00",
    "11:00 - 12:00",
    "12:00 - 1:00",
    "1:00 - 2:00",
    "2:00 - 3:00",
    "3:00 - 4:00",
];

/// A class-section, identified by (division, department, year).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: String,
    pub division: String,
    pub department: String,
    pub year: String,
    pub created_at: String,
}

impl ClassSection {
    pub fn label(&self) -> String {
        timetable_label(&self.year, &self.department, &self.division)
    }
}

/// Request body for creating a class-section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
}

/// Label under which a section's timetable (and its students) are filed.
pub fn timetable_label(year: &str, department: &str, division: &str) -> String {
    format!("{} - {} {}", year, department, division)
}

/// One lesson in the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub day: String,
    pub time_slot: String,
    pub subject: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub room: String,
}

/// The timetable of one class-section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub label: String,
    pub time_slots: Vec<String>,
    pub entries: Vec<TimetableEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Timetable {
    /// Placeholder for a class without a stored timetable.
    pub fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            time_slots: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
            entries: Vec::new(),
            updated_at: None,
        }
    }
}

/// Department/year/division selection, used as query string and body prefix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionSelection {
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub division: String,
}

impl SectionSelection {
    pub fn is_complete(&self) -> bool {
        !self.department.trim().is_empty()
            && !self.year.trim().is_empty()
            && !self.division.trim().is_empty()
    }

    pub fn label(&self) -> String {
        timetable_label(
            self.year.trim(),
            self.department.trim(),
            self.division.trim(),
        )
    }
}

/// Admin timetable screen: filter options plus the selected timetable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOverview {
    pub departments: Vec<String>,
    pub years: Vec<String>,
    pub divisions: Vec<String>,
    pub selected_department: String,
    pub selected_year: String,
    pub selected_division: String,
    pub timetable: Option<Timetable>,
}

/// Request body for replacing a timetable's time slots.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotsRequest {
    #[serde(flatten)]
    pub section: SectionSelection,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

/// Request body for appending a timetable entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    #[serde(flatten)]
    pub section: SectionSelection,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub room: String,
}

/// Request body for removing the entry at `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteEntryRequest {
    #[serde(flatten)]
    pub section: SectionSelection,
    pub index: i64,
}

/// Student timetable screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentTimetable {
    pub timetable: Timetable,
    pub current_day: String,
}

/// Distinct non-empty values, sorted.
pub fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: std::collections::BTreeSet<&str> = values.filter(|v| !v.is_empty()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Build the admin timetable filters from the known class-sections.
pub fn overview_options(
    classes: &[ClassSection],
    selection: &SectionSelection,
) -> (Vec<String>, Vec<String>, Vec<String>) {
    let department = selection.department.trim();
    let year = selection.year.trim();
    let departments = distinct_sorted(classes.iter().map(|c| c.department.as_str()));
    let years = distinct_sorted(classes.iter().map(|c| c.year.as_str()));
    let divisions = distinct_sorted(
        classes
            .iter()
            .filter(|c| c.department == department && c.year == year)
            .map(|c| c.division.as_str()),
    );
    (departments, years, divisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(division: &str, department: &str, year: &str) -> ClassSection {
        ClassSection {
            id: format!("{}-{}-{}", year, department, division),
            division: division.to_string(),
            department: department.to_string(),
            year: year.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_label_format() {
        assert_eq!(
            section("A", "ECE", "3rd Year").label(),
            "3rd Year - ECE A"
        );
    }

    #[test]
    fn test_overview_options() {
        let classes = vec![
            section("B", "ECE", "3rd Year"),
            section("A", "ECE", "3rd Year"),
            section("A", "CSE", "2nd Year"),
            section("A", "", "1st Year"),
        ];
        let selection = SectionSelection {
            department: "ECE".to_string(),
            year: "3rd Year".to_string(),
            division: String::new(),
        };

        let (departments, years, divisions) = overview_options(&classes, &selection);
        assert_eq!(departments, vec!["CSE", "ECE"]);
        assert_eq!(years, vec!["1st Year", "2nd Year", "3rd Year"]);
        assert_eq!(divisions, vec!["A", "B"]);
        assert!(!selection.is_complete());
    }

    #[test]
    fn test_empty_timetable_has_default_slots() {
        let timetable = Timetable::empty("3rd Year - ECE A");
        assert_eq!(timetable.time_slots.len(), 7);
        assert!(timetable.entries.is_empty());
    }
}
