use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("percentage {0} is outside 0..=100")]
    InvalidPercentage(f64),

    #[error("subject {subject_id} is misconfigured: {reason}")]
    InvalidSubject { subject_id: String, reason: String },

    #[error("marks {marks} for subject {subject_id} are outside 0..={full_marks}")]
    OutOfRangeMarks {
        subject_id: String,
        marks: f64,
        full_marks: f64,
    },

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    #[error("duplicate mark entry for student {student_id}, exam {exam_id}, subject {subject_id}")]
    DuplicateMarkEntry {
        student_id: String,
        exam_id: String,
        subject_id: String,
    },

    #[error("duplicate attendance entry for student {student_id} on {date}")]
    DuplicateAttendance { student_id: String, date: NaiveDate },

    #[error("period end {end} is before start {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("exam {0} is not published")]
    ExamNotPublished(String),
}

impl CalcError {
    /// Stable code surfaced in IPC error objects.
    pub fn code(&self) -> &'static str {
        match self {
            CalcError::InvalidPercentage(_) => "invalid_percentage",
            CalcError::InvalidSubject { .. } => "invalid_subject",
            CalcError::OutOfRangeMarks { .. } => "out_of_range_marks",
            CalcError::StudentNotFound(_) => "student_not_found",
            CalcError::SubjectNotFound(_) => "subject_not_found",
            CalcError::DuplicateMarkEntry { .. } => "duplicate_mark_entry",
            CalcError::DuplicateAttendance { .. } => "duplicate_attendance",
            CalcError::InvalidPeriod { .. } => "invalid_period",
            CalcError::ExamNotPublished(_) => "exam_not_published",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case() {
        let e = CalcError::OutOfRangeMarks {
            subject_id: "math".into(),
            marks: 120.0,
            full_marks: 100.0,
        };
        assert_eq!(e.code(), "out_of_range_marks");
        assert_eq!(
            e.to_string(),
            "marks 120 for subject math are outside 0..=100"
        );
    }
}
