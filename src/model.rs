//! Records handed over by the storage layer, shaped as they arrive on the wire
//! (camelCase JSON, nullable marks).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub full_marks: f64,
    pub pass_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSubjectAssignment {
    pub class_id: String,
    pub subject_id: String,
}

/// Terminal assessments of an academic year. Variant order is the canonical
/// order reports print them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExamType {
    #[serde(alias = "first_terminal")]
    Periodic,
    #[serde(alias = "second_terminal", alias = "half_yearly")]
    HalfYearly,
    Final,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub class_id: String,
    pub academic_year_id: String,
    pub exam_type: ExamType,
    #[serde(default)]
    pub is_published: bool,
}

/// One stored mark. `marks_obtained = None` means "not yet entered".
/// The stored `grade` is informational only; grades are always recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    pub student_id: String,
    pub exam_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub marks_obtained: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    pub class_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    pub class_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_type_accepts_storage_aliases() {
        let t: ExamType = serde_json::from_str("\"first_terminal\"").expect("alias");
        assert_eq!(t, ExamType::Periodic);
        let t: ExamType = serde_json::from_str("\"second_terminal\"").expect("alias");
        assert_eq!(t, ExamType::HalfYearly);
        let t: ExamType = serde_json::from_str("\"halfYearly\"").expect("camel");
        assert_eq!(t, ExamType::HalfYearly);
        assert!(ExamType::Periodic < ExamType::HalfYearly);
        assert!(ExamType::HalfYearly < ExamType::Final);
    }

    #[test]
    fn mark_entry_defaults_missing_marks_to_none() {
        let m: MarkEntry = serde_json::from_value(serde_json::json!({
            "studentId": "s1",
            "examId": "e1",
            "subjectId": "math"
        }))
        .expect("mark entry");
        assert_eq!(m.marks_obtained, None);
        assert_eq!(m.grade, None);
    }

    #[test]
    fn unpublished_by_default() {
        let e: Exam = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "classId": "c1",
            "academicYearId": "y1",
            "examType": "final"
        }))
        .expect("exam");
        assert!(!e.is_published);
    }
}
