//! Builders that turn raw storage snapshots into the documents consumers
//! print. Only published exams ever reach these outputs.

use super::combined::{combine, CombinedReport, ExamSheet};
use super::exam::{aggregate_exam, ExamResult};
use crate::error::{CalcError, Result};
use crate::model::{ClassSubjectAssignment, Exam, ExamType, MarkEntry, Student, Subject};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarksheet {
    pub student_id: String,
    pub exam_id: String,
    pub exam_type: ExamType,
    pub result: ExamResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCombinedReport {
    pub student_id: String,
    pub class_id: String,
    pub academic_year_id: String,
    pub report: CombinedReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResultRow {
    pub student_id: String,
    pub student_name: String,
    pub roll_number: Option<String>,
    pub position: Option<usize>,
    pub result: ExamResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassExamSummary {
    pub exam_id: String,
    pub class_id: String,
    pub exam_type: ExamType,
    pub rows: Vec<ClassResultRow>,
    pub enrolled: usize,
    pub appeared: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_percentage: f64,
    pub highest_percentage: f64,
}

/// Subjects assigned to `class_id`, in subject-list order.
pub fn subjects_for_class(
    subjects: &[Subject],
    assignments: &[ClassSubjectAssignment],
    class_id: &str,
) -> Vec<Subject> {
    let assigned: HashSet<&str> = assignments
        .iter()
        .filter(|a| a.class_id == class_id)
        .map(|a| a.subject_id.as_str())
        .collect();
    let mut seen: HashSet<&str> = HashSet::new();
    subjects
        .iter()
        .filter(|s| assigned.contains(s.id.as_str()) && seen.insert(s.id.as_str()))
        .cloned()
        .collect()
}

fn marks_for(marks: &[MarkEntry], exam_id: &str, student_id: &str) -> Vec<MarkEntry> {
    marks
        .iter()
        .filter(|m| m.exam_id == exam_id && m.student_id == student_id)
        .cloned()
        .collect()
}

pub fn student_marksheet(
    exam: &Exam,
    subjects: &[Subject],
    assignments: &[ClassSubjectAssignment],
    marks: &[MarkEntry],
    student_id: &str,
) -> Result<StudentMarksheet> {
    if !exam.is_published {
        return Err(CalcError::ExamNotPublished(exam.id.clone()));
    }
    let class_subjects = subjects_for_class(subjects, assignments, &exam.class_id);
    let own = marks_for(marks, &exam.id, student_id);
    Ok(StudentMarksheet {
        student_id: student_id.to_string(),
        exam_id: exam.id.clone(),
        exam_type: exam.exam_type,
        result: aggregate_exam(&class_subjects, &own)?,
    })
}

/// Consolidated report over the published exams of one class and academic
/// year. Unpublished exams are left out as if they did not exist.
pub fn student_combined_report(
    class_id: &str,
    academic_year_id: &str,
    exams: &[Exam],
    subjects: &[Subject],
    assignments: &[ClassSubjectAssignment],
    marks: &[MarkEntry],
    student_id: &str,
) -> Result<StudentCombinedReport> {
    let class_subjects = subjects_for_class(subjects, assignments, class_id);

    let mut sheets = Vec::new();
    for exam in exams
        .iter()
        .filter(|e| e.class_id == class_id && e.academic_year_id == academic_year_id)
    {
        if !exam.is_published {
            debug!(exam_id = %exam.id, "skipping unpublished exam");
            continue;
        }
        let own = marks_for(marks, &exam.id, student_id);
        sheets.push(ExamSheet {
            exam_id: exam.id.clone(),
            exam_type: exam.exam_type,
            result: aggregate_exam(&class_subjects, &own)?,
        });
    }

    Ok(StudentCombinedReport {
        student_id: student_id.to_string(),
        class_id: class_id.to_string(),
        academic_year_id: academic_year_id.to_string(),
        report: combine(&class_subjects, &sheets)?,
    })
}

/// Every enrolled student's result for one exam plus class statistics.
/// Positions are competition ranks (1, 2, 2, 4) by percentage among
/// students who had at least one graded subject.
pub fn class_exam_summary(
    exam: &Exam,
    subjects: &[Subject],
    assignments: &[ClassSubjectAssignment],
    students: &[Student],
    marks: &[MarkEntry],
) -> Result<ClassExamSummary> {
    if !exam.is_published {
        return Err(CalcError::ExamNotPublished(exam.id.clone()));
    }
    let class_subjects = subjects_for_class(subjects, assignments, &exam.class_id);

    let mut by_student: HashMap<&str, Vec<MarkEntry>> = HashMap::new();
    for m in marks.iter().filter(|m| m.exam_id == exam.id) {
        by_student
            .entry(m.student_id.as_str())
            .or_default()
            .push(m.clone());
    }

    let mut rows = Vec::new();
    for s in students.iter().filter(|s| s.class_id == exam.class_id) {
        let own = by_student.remove(s.id.as_str()).unwrap_or_default();
        rows.push(ClassResultRow {
            student_id: s.id.clone(),
            student_name: s.name.clone(),
            roll_number: s.roll_number.clone(),
            position: None,
            result: aggregate_exam(&class_subjects, &own)?,
        });
    }
    if !by_student.is_empty() {
        debug!(
            count = by_student.len(),
            "marks for students outside the class roster ignored"
        );
    }

    let appeared: Vec<f64> = rows
        .iter()
        .filter(|r| r.result.counted_subjects > 0)
        .map(|r| r.result.percentage)
        .collect();
    for r in rows.iter_mut().filter(|r| r.result.counted_subjects > 0) {
        let ahead = appeared.iter().filter(|p| **p > r.result.percentage).count();
        r.position = Some(ahead + 1);
    }

    let passed = rows.iter().filter(|r| r.result.passed).count();
    let average_percentage = if appeared.is_empty() {
        0.0
    } else {
        appeared.iter().sum::<f64>() / appeared.len() as f64
    };
    let highest_percentage = appeared.iter().copied().fold(0.0_f64, f64::max);

    Ok(ClassExamSummary {
        exam_id: exam.id.clone(),
        class_id: exam.class_id.clone(),
        exam_type: exam.exam_type,
        enrolled: rows.len(),
        appeared: appeared.len(),
        passed,
        failed: appeared.len() - passed,
        average_percentage,
        highest_percentage,
        rows,
    })
}
