use crate::calc::reports::{class_exam_summary, student_combined_report, student_marksheet};
use crate::calc::{aggregate_exam, combine, ExamSheet};
use crate::ipc::error::{parse_params, respond, to_result, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassSubjectAssignment, Exam, ExamType, MarkEntry, Student, Subject};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExamParams {
    subjects: Vec<Subject>,
    #[serde(default)]
    marks: Vec<MarkEntry>,
}

/// Raw aggregation over exactly the subjects given. No publishing check:
/// this is the data-entry view.
fn results_exam(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: ExamParams = parse_params(&req.params)?;
    to_result(&aggregate_exam(&p.subjects, &p.marks)?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarksheetParams {
    exam: Exam,
    student_id: String,
    subjects: Vec<Subject>,
    assignments: Vec<ClassSubjectAssignment>,
    #[serde(default)]
    marks: Vec<MarkEntry>,
}

fn results_marksheet(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: MarksheetParams = parse_params(&req.params)?;
    let sheet = student_marksheet(&p.exam, &p.subjects, &p.assignments, &p.marks, &p.student_id)?;
    to_result(&sheet)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaggedExamMarks {
    exam_id: String,
    exam_type: ExamType,
    #[serde(default)]
    marks: Vec<MarkEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CombinedParams {
    student_id: Option<String>,
    class_id: Option<String>,
    academic_year_id: Option<String>,
    #[serde(default)]
    exams: Vec<Exam>,
    subjects: Vec<Subject>,
    #[serde(default)]
    assignments: Vec<ClassSubjectAssignment>,
    #[serde(default)]
    marks: Vec<MarkEntry>,
    /// Direct form: per-exam marks over `subjects`, no publishing filter.
    #[serde(default)]
    sheets: Option<Vec<TaggedExamMarks>>,
}

fn results_combined(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: CombinedParams = parse_params(&req.params)?;

    if let Some(tagged) = p.sheets {
        let mut sheets = Vec::with_capacity(tagged.len());
        for t in tagged {
            sheets.push(ExamSheet {
                result: aggregate_exam(&p.subjects, &t.marks)?,
                exam_id: t.exam_id,
                exam_type: t.exam_type,
            });
        }
        return to_result(&combine(&p.subjects, &sheets)?);
    }

    let (Some(student_id), Some(class_id), Some(year_id)) =
        (p.student_id, p.class_id, p.academic_year_id)
    else {
        return Err(HandlerErr::bad_params(
            "studentId, classId and academicYearId are required unless sheets[] is given",
        ));
    };
    let report = student_combined_report(
        &class_id,
        &year_id,
        &p.exams,
        &p.subjects,
        &p.assignments,
        &p.marks,
        &student_id,
    )?;
    to_result(&report)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassParams {
    exam: Exam,
    subjects: Vec<Subject>,
    assignments: Vec<ClassSubjectAssignment>,
    students: Vec<Student>,
    #[serde(default)]
    marks: Vec<MarkEntry>,
}

fn results_class(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: ClassParams = parse_params(&req.params)?;
    let summary = class_exam_summary(&p.exam, &p.subjects, &p.assignments, &p.students, &p.marks)?;
    to_result(&summary)
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let outcome = match req.method.as_str() {
        "results.exam" => results_exam(req),
        "results.marksheet" => results_marksheet(req),
        "results.combined" => results_combined(req),
        "results.class" => results_class(req),
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
