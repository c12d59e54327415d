use super::grade::{grade, Grade};
use super::percent_of;
use super::subject::{assess, SubjectResult};
use crate::error::{CalcError, Result};
use crate::model::{MarkEntry, Subject};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub subjects: Vec<SubjectResult>,
    pub counted_subjects: usize,
    pub total: f64,
    pub full_total: f64,
    pub percentage: f64,
    pub passed: bool,
    pub grade: Grade,
}

/// Aggregates one student's marks for one exam over the class subject set.
///
/// Subjects without an entered mark are skipped from both `total` and
/// `full_total`, so a partially graded exam is a percentage over the graded
/// subjects only. An exam with nothing graded is `passed = false` at 0%.
pub fn aggregate_exam(subjects: &[Subject], marks: &[MarkEntry]) -> Result<ExamResult> {
    let mut by_subject: HashMap<&str, &MarkEntry> = HashMap::with_capacity(marks.len());
    for m in marks {
        if by_subject.insert(m.subject_id.as_str(), m).is_some() {
            return Err(CalcError::DuplicateMarkEntry {
                student_id: m.student_id.clone(),
                exam_id: m.exam_id.clone(),
                subject_id: m.subject_id.clone(),
            });
        }
    }

    let mut listed: HashSet<&str> = HashSet::with_capacity(subjects.len());
    if let Some(dup) = subjects.iter().find(|s| !listed.insert(s.id.as_str())) {
        return Err(CalcError::InvalidSubject {
            subject_id: dup.id.clone(),
            reason: "subject listed more than once".to_string(),
        });
    }

    let mut results = Vec::with_capacity(subjects.len());
    let mut total = 0.0_f64;
    let mut full_total = 0.0_f64;
    let mut counted_subjects = 0_usize;
    let mut all_passed = true;

    for s in subjects {
        let entered = by_subject.get(s.id.as_str()).and_then(|m| m.marks_obtained);
        let r = assess(s, entered)?;
        if let Some(v) = r.marks_obtained.filter(|_| r.counted) {
            total += v;
            full_total += s.full_marks;
            counted_subjects += 1;
            all_passed &= r.passed;
        } else {
            debug!(subject_id = %s.id, "subject not graded, excluded from totals");
        }
        results.push(r);
    }

    let percentage = percent_of(total, full_total);
    Ok(ExamResult {
        subjects: results,
        counted_subjects,
        total,
        full_total,
        percentage,
        passed: counted_subjects > 0 && all_passed,
        grade: grade(percentage)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str, full: f64, pass: f64) -> Subject {
        Subject {
            id: id.into(),
            name: id.to_uppercase(),
            code: id.to_uppercase(),
            full_marks: full,
            pass_marks: pass,
        }
    }

    fn mark(subject_id: &str, v: Option<f64>) -> MarkEntry {
        MarkEntry {
            student_id: "s1".into(),
            exam_id: "e1".into(),
            subject_id: subject_id.into(),
            marks_obtained: v,
            grade: None,
        }
    }

    #[test]
    fn missing_mark_is_excluded_not_zero() {
        let subjects = vec![subject("math", 100.0, 40.0), subject("science", 100.0, 40.0)];
        let marks = vec![mark("math", None), mark("science", Some(80.0))];
        let r = aggregate_exam(&subjects, &marks).expect("aggregate");
        assert_eq!(r.total, 80.0);
        assert_eq!(r.full_total, 100.0);
        assert_eq!(r.percentage, 80.0);
        assert!(r.passed);
        assert_eq!(r.counted_subjects, 1);
        assert_eq!(r.grade, Grade::A);
    }

    #[test]
    fn unmarked_assigned_subject_is_skipped() {
        let subjects = vec![subject("math", 100.0, 40.0), subject("nepali", 50.0, 20.0)];
        let marks = vec![mark("math", Some(35.0))];
        let r = aggregate_exam(&subjects, &marks).expect("aggregate");
        assert_eq!(r.subjects.len(), 2);
        assert!(!r.subjects[1].counted);
        assert_eq!(r.full_total, 100.0);
        assert!(!r.passed, "math below pass marks");
    }

    #[test]
    fn nothing_graded_is_zero_and_failed() {
        let subjects = vec![subject("math", 100.0, 40.0)];
        let r = aggregate_exam(&subjects, &[]).expect("aggregate");
        assert_eq!(r.percentage, 0.0);
        assert_eq!(r.total, 0.0);
        assert!(!r.passed);
        assert_eq!(r.grade, Grade::E);
    }

    #[test]
    fn marks_for_unassigned_subjects_are_ignored() {
        let subjects = vec![subject("math", 100.0, 40.0)];
        let marks = vec![mark("math", Some(60.0)), mark("art", Some(10.0))];
        let r = aggregate_exam(&subjects, &marks).expect("aggregate");
        assert_eq!(r.total, 60.0);
        assert_eq!(r.subjects.len(), 1);
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let subjects = vec![subject("math", 100.0, 40.0)];
        let marks = vec![mark("math", Some(60.0)), mark("math", Some(70.0))];
        let err = aggregate_exam(&subjects, &marks).expect_err("duplicate");
        assert_eq!(err.code(), "duplicate_mark_entry");
    }

    #[test]
    fn repeated_subject_is_rejected_not_double_counted() {
        let subjects = vec![subject("math", 100.0, 40.0), subject("math", 100.0, 40.0)];
        let marks = vec![mark("math", Some(60.0))];
        let err = aggregate_exam(&subjects, &marks).expect_err("repeated subject");
        assert_eq!(
            err,
            CalcError::InvalidSubject {
                subject_id: "math".into(),
                reason: "subject listed more than once".into(),
            }
        );
    }

    #[test]
    fn out_of_range_mark_fails_the_whole_exam() {
        let subjects = vec![subject("math", 100.0, 40.0)];
        let marks = vec![mark("math", Some(101.0))];
        assert!(matches!(
            aggregate_exam(&subjects, &marks),
            Err(CalcError::OutOfRangeMarks { .. })
        ));
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let subjects = vec![subject("math", 100.0, 40.0), subject("science", 75.0, 30.0)];
        let marks = vec![mark("math", Some(66.5)), mark("science", Some(41.0))];
        let a = aggregate_exam(&subjects, &marks).expect("aggregate");
        let b = aggregate_exam(&subjects, &marks).expect("aggregate");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json")
        );
    }
}
