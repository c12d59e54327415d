use super::grade::{grade, Grade};
use crate::error::{CalcError, Result};
use crate::model::Subject;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_code: String,
    pub full_marks: f64,
    pub pass_marks: f64,
    pub marks_obtained: Option<f64>,
    pub grade: Option<Grade>,
    pub passed: bool,
    pub counted: bool,
}

pub fn validate_subject(subject: &Subject) -> Result<()> {
    let invalid = |reason: String| CalcError::InvalidSubject {
        subject_id: subject.id.clone(),
        reason,
    };
    if !subject.full_marks.is_finite() || subject.full_marks <= 0.0 {
        return Err(invalid(format!(
            "full marks must be > 0 (got {})",
            subject.full_marks
        )));
    }
    if !subject.pass_marks.is_finite()
        || subject.pass_marks <= 0.0
        || subject.pass_marks > subject.full_marks
    {
        return Err(invalid(format!(
            "pass marks must be in (0, {}] (got {})",
            subject.full_marks, subject.pass_marks
        )));
    }
    Ok(())
}

/// Assesses one mark against its subject. `None` is "not entered" and yields
/// an uncounted result; out-of-range marks are rejected, never clamped.
pub fn assess(subject: &Subject, marks_obtained: Option<f64>) -> Result<SubjectResult> {
    validate_subject(subject)?;

    let mut out = SubjectResult {
        subject_id: subject.id.clone(),
        subject_name: subject.name.clone(),
        subject_code: subject.code.clone(),
        full_marks: subject.full_marks,
        pass_marks: subject.pass_marks,
        marks_obtained: None,
        grade: None,
        passed: false,
        counted: false,
    };

    let Some(marks) = marks_obtained else {
        return Ok(out);
    };
    if !marks.is_finite() || marks < 0.0 || marks > subject.full_marks {
        return Err(CalcError::OutOfRangeMarks {
            subject_id: subject.id.clone(),
            marks,
            full_marks: subject.full_marks,
        });
    }

    out.marks_obtained = Some(marks);
    out.grade = Some(grade(marks / subject.full_marks * 100.0)?);
    out.passed = marks >= subject.pass_marks;
    out.counted = true;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math() -> Subject {
        Subject {
            id: "math".into(),
            name: "Mathematics".into(),
            code: "MTH".into(),
            full_marks: 100.0,
            pass_marks: 40.0,
        }
    }

    #[test]
    fn missing_mark_is_uncounted() {
        let r = assess(&math(), None).expect("assess");
        assert!(!r.counted);
        assert!(!r.passed);
        assert_eq!(r.grade, None);
        assert_eq!(r.marks_obtained, None);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let r = assess(&math(), Some(40.0)).expect("assess");
        assert!(r.passed);
        assert_eq!(r.grade, Some(Grade::C));
        let r = assess(&math(), Some(39.5)).expect("assess");
        assert!(!r.passed);
        assert_eq!(r.grade, Some(Grade::D));
    }

    #[test]
    fn grade_uses_subject_full_marks() {
        let mut s = math();
        s.full_marks = 50.0;
        s.pass_marks = 16.0;
        let r = assess(&s, Some(45.0)).expect("assess");
        assert_eq!(r.grade, Some(Grade::APlus));
        let r = assess(&s, Some(0.0)).expect("assess");
        assert!(r.counted);
        assert_eq!(r.grade, Some(Grade::E));
    }

    #[test]
    fn out_of_range_marks_are_rejected() {
        let err = assess(&math(), Some(100.5)).expect_err("over full marks");
        assert_eq!(err.code(), "out_of_range_marks");
        let err = assess(&math(), Some(-1.0)).expect_err("negative");
        assert_eq!(err.code(), "out_of_range_marks");
        assert!(assess(&math(), Some(100.0)).is_ok());
    }

    #[test]
    fn misconfigured_subject_is_rejected() {
        let mut s = math();
        s.pass_marks = 120.0;
        assert_eq!(
            assess(&s, Some(50.0)).expect_err("pass > full").code(),
            "invalid_subject"
        );
        s.full_marks = 0.0;
        assert!(assess(&s, None).is_err());
    }
}
