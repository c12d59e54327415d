use super::exam::ExamResult;
use super::grade::{grade, Grade};
use super::percent_of;
use crate::error::Result;
use crate::model::{ExamType, Subject};
use serde::Serialize;

/// One exam's already-computed result, tagged with what it was.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSheet {
    pub exam_id: String,
    pub exam_type: ExamType,
    pub result: ExamResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummaryRow {
    pub exam_id: String,
    pub exam_type: ExamType,
    pub total: f64,
    pub full_total: f64,
    pub percentage: f64,
    pub passed: bool,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedCell {
    pub exam_id: String,
    pub exam_type: ExamType,
    pub marks_obtained: Option<f64>,
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSubjectRow {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_code: String,
    pub full_marks: f64,
    pub exams: Vec<CombinedCell>,
    pub combined_total: f64,
    pub combined_full_total: f64,
    pub combined_percentage: f64,
    pub combined_grade: Option<Grade>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedReport {
    pub exams: Vec<ExamSummaryRow>,
    pub subjects: Vec<CombinedSubjectRow>,
    pub grand_total: f64,
    pub grand_full_total: f64,
    pub grand_percentage: f64,
    pub grand_grade: Grade,
    pub passed: bool,
}

/// Folds per-exam results into one report. Exams are laid out in canonical
/// type order; exam-level figures are carried through unchanged.
pub fn combine(subjects: &[Subject], sheets: &[ExamSheet]) -> Result<CombinedReport> {
    let mut ordered: Vec<&ExamSheet> = sheets.iter().collect();
    // Stable: two sheets of the same type keep their input order.
    ordered.sort_by_key(|s| s.exam_type);

    let exams: Vec<ExamSummaryRow> = ordered
        .iter()
        .map(|s| ExamSummaryRow {
            exam_id: s.exam_id.clone(),
            exam_type: s.exam_type,
            total: s.result.total,
            full_total: s.result.full_total,
            percentage: s.result.percentage,
            passed: s.result.passed,
            grade: s.result.grade,
        })
        .collect();

    let mut rows = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let mut cells = Vec::with_capacity(ordered.len());
        let mut combined_total = 0.0_f64;
        let mut combined_full_total = 0.0_f64;

        for sheet in &ordered {
            let hit = sheet
                .result
                .subjects
                .iter()
                .find(|r| r.subject_id == subject.id);
            let counted = hit.filter(|r| r.counted);
            if let Some(v) = counted.and_then(|r| r.marks_obtained) {
                combined_total += v;
                combined_full_total += subject.full_marks;
            }
            cells.push(CombinedCell {
                exam_id: sheet.exam_id.clone(),
                exam_type: sheet.exam_type,
                marks_obtained: counted.and_then(|r| r.marks_obtained),
                grade: counted.and_then(|r| r.grade),
            });
        }

        let combined_percentage = percent_of(combined_total, combined_full_total);
        let combined_grade = if combined_full_total > 0.0 {
            Some(grade(combined_percentage)?)
        } else {
            None
        };
        rows.push(CombinedSubjectRow {
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            subject_code: subject.code.clone(),
            full_marks: subject.full_marks,
            exams: cells,
            combined_total,
            combined_full_total,
            combined_percentage,
            combined_grade,
        });
    }

    let grand_total: f64 = exams.iter().map(|e| e.total).sum();
    let grand_full_total: f64 = exams.iter().map(|e| e.full_total).sum();
    let grand_percentage = percent_of(grand_total, grand_full_total);

    Ok(CombinedReport {
        passed: !exams.is_empty() && exams.iter().all(|e| e.passed),
        grand_grade: grade(grand_percentage)?,
        exams,
        subjects: rows,
        grand_total,
        grand_full_total,
        grand_percentage,
    })
}
