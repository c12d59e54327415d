//! Bulk roster / marks uploads: comma-separated parsing and per-row checks.
//!
//! Rows are validated independently. A bad row never aborts the upload; it
//! is reported as `Row N: <message>` (N is the line of the uploaded file,
//! header being line 1) and the
//! caller decides what to do with the accepted remainder.

use crate::model::{Exam, MarkEntry, Student, Subject};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file has no header row")]
    MissingHeader,

    #[error("upload has {rows} rows, limit is {max}")]
    TooManyRows { rows: usize, max: usize },

    #[error("malformed comma-separated data: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::MissingHeader => "missing_header",
            ImportError::TooManyRows { .. } => "too_many_rows",
            ImportError::Csv(_) => "bad_csv",
        }
    }
}

/// One data record. `row_number` is the file line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub row_number: usize,
    pub fields: BTreeMap<String, String>,
}

impl ImportRow {
    /// Trimmed, non-empty value of the first matching column.
    fn value(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }
}

/// `" Date of  Birth "` -> `"date_of_birth"`.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalizes an upload before the reader sees it, so that record positions
/// match file lines and padded quotes still quote:
/// - `\r\n` becomes `\n`;
/// - a blank line after the header becomes a lone `,` (a record that is
///   skipped later) instead of being swallowed by the reader;
/// - spaces between a separator and an opening quote (`a, "b"`) are dropped,
///   otherwise the quotes would be read as literal text.
fn prepare_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_quotes = false;
    let mut field_start = true;
    let mut line_start = true;
    let mut seen_header = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        if c == '\n' && line_start && seen_header {
            out.push(',');
        }
        if field_start && !in_quotes && (c == ' ' || c == '\t') {
            let mut pad = String::from(c);
            while let Some(&n) = chars.peek() {
                if n != ' ' && n != '\t' {
                    break;
                }
                pad.push(n);
                chars.next();
            }
            if chars.peek() != Some(&'"') {
                out.push_str(&pad);
                field_start = false;
                line_start = false;
            }
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c == '\n' && !in_quotes && !line_start {
            seen_header = true;
        }
        field_start = !in_quotes && matches!(c, ',' | '\n');
        line_start = !in_quotes && c == '\n';
        out.push(c);
    }
    out
}

/// Parses an upload into rows keyed by normalized header. `row_number` is
/// the file line the record starts on, so blank lines still count.
pub fn parse_table(text: &str, max_rows: usize) -> Result<Vec<ImportRow>, ImportError> {
    let cleaned = prepare_text(text.trim_start_matches('\u{feff}'));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(cleaned.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();
        let row_number = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(ImportRow { row_number, fields });
        if rows.len() > max_rows {
            return Err(ImportError::TooManyRows {
                rows: rows.len(),
                max: max_rows,
            });
        }
    }
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowIssue {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be at least 2 characters")]
    TooShort(&'static str),

    #[error("Invalid date format (use YYYY-MM-DD)")]
    InvalidDate,

    #[error("Invalid status '{0}' (use active, inactive, graduated or transferred)")]
    InvalidStatus(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Marks must be a number (got '{0}')")]
    InvalidNumber(String),

    #[error("Marks {marks} out of range for {subject} (0-{full_marks})")]
    OutOfRangeMarks {
        subject: String,
        marks: f64,
        full_marks: f64,
    },

    #[error("Duplicate marks for student {student_id} in {subject}")]
    DuplicateMarks { student_id: String, subject: String },
}

impl RowIssue {
    pub fn code(&self) -> &'static str {
        match self {
            RowIssue::Required(_) => "required",
            RowIssue::TooShort(_) => "too_short",
            RowIssue::InvalidDate => "invalid_date",
            RowIssue::InvalidStatus(_) => "invalid_status",
            RowIssue::StudentNotFound(_) => "student_not_found",
            RowIssue::SubjectNotFound(_) => "subject_not_found",
            RowIssue::InvalidNumber(_) => "invalid_number",
            RowIssue::OutOfRangeMarks { .. } => "out_of_range_marks",
            RowIssue::DuplicateMarks { .. } => "duplicate_marks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    pub row: usize,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport<T> {
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub accepted: Vec<T>,
    pub errors: Vec<String>,
    pub rejections: Vec<RowRejection>,
}

impl<T> ImportReport<T> {
    fn new() -> Self {
        Self {
            total_rows: 0,
            valid_count: 0,
            invalid_count: 0,
            accepted: Vec::new(),
            errors: Vec::new(),
            rejections: Vec::new(),
        }
    }

    fn push(&mut self, row_number: usize, outcome: Result<T, Vec<RowIssue>>) {
        self.total_rows += 1;
        match outcome {
            Ok(record) => {
                self.valid_count += 1;
                self.accepted.push(record);
            }
            Err(issues) => {
                self.invalid_count += 1;
                for issue in issues {
                    warn!(row = row_number, code = issue.code(), "import row rejected: {}", issue);
                    self.errors.push(format!("Row {}: {}", row_number, issue));
                    self.rejections.push(RowRejection {
                        row: row_number,
                        code: issue.code(),
                        message: issue.to_string(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Inactive,
    Graduated,
    Transferred,
}

impl StudentStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(StudentStatus::Active),
            "inactive" => Some(StudentStatus::Inactive),
            "graduated" => Some(StudentStatus::Graduated),
            "transferred" => Some(StudentStatus::Transferred),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub status: Option<StudentStatus>,
    pub roll_number: Option<String>,
    pub gender: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Strict `YYYY-MM-DD`: zero-padded, and a real calendar day.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let b = raw.as_bytes();
    let shape_ok = b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn required_name(row: &ImportRow, key: &'static str, issues: &mut Vec<RowIssue>) -> String {
    match row.value(&[key]) {
        None => {
            issues.push(RowIssue::Required(key));
            String::new()
        }
        Some(v) if v.chars().count() < 2 => {
            issues.push(RowIssue::TooShort(key));
            String::new()
        }
        Some(v) => v.to_string(),
    }
}

pub fn validate_roster_row(row: &ImportRow) -> Result<RosterRecord, Vec<RowIssue>> {
    let mut issues = Vec::new();

    let first_name = required_name(row, "first_name", &mut issues);
    let last_name = required_name(row, "last_name", &mut issues);

    let date_of_birth = match row.value(&["date_of_birth", "dob"]) {
        None => {
            issues.push(RowIssue::Required("date_of_birth"));
            None
        }
        Some(raw) => {
            let parsed = parse_iso_date(raw);
            if parsed.is_none() {
                issues.push(RowIssue::InvalidDate);
            }
            parsed
        }
    };

    let status = match row.value(&["status"]) {
        None => None,
        Some(raw) => {
            let parsed = StudentStatus::parse(raw);
            if parsed.is_none() {
                issues.push(RowIssue::InvalidStatus(raw.to_string()));
            }
            parsed
        }
    };

    let (Some(date_of_birth), true) = (date_of_birth, issues.is_empty()) else {
        return Err(issues);
    };

    let opt = |keys: &[&str]| row.value(keys).map(str::to_string);
    Ok(RosterRecord {
        first_name,
        middle_name: opt(&["middle_name"]),
        last_name,
        date_of_birth,
        status,
        roll_number: opt(&["roll_number", "roll_no"]),
        gender: opt(&["gender"]),
        class: opt(&["class"]),
        section: opt(&["section"]),
        guardian_name: opt(&["guardian_name"]),
        phone: opt(&["phone"]),
        email: opt(&["email"]),
        address: opt(&["address"]),
    })
}

pub fn validate_roster(rows: &[ImportRow]) -> ImportReport<RosterRecord> {
    let mut report = ImportReport::new();
    for row in rows {
        report.push(row.row_number, validate_roster_row(row));
    }
    info!(
        valid = report.valid_count,
        invalid = report.invalid_count,
        "roster upload validated"
    );
    report
}

/// Resolves the row's student among those enrolled in `class_id`, by
/// `student_id` if stated, else by `roll_number`. A roll number shared by
/// several students of the class is not a match.
fn resolve_student<'a>(
    row: &ImportRow,
    class_id: &str,
    students: &'a [Student],
) -> Result<&'a Student, RowIssue> {
    let mut enrolled = students.iter().filter(|s| s.class_id == class_id);
    if let Some(id) = row.value(&["student_id"]) {
        return enrolled
            .find(|s| s.id == id)
            .ok_or_else(|| RowIssue::StudentNotFound(id.to_string()));
    }
    let Some(roll) = row.value(&["roll_number", "roll_no"]) else {
        return Err(RowIssue::StudentNotFound(
            "no student_id or roll_number given".to_string(),
        ));
    };
    let mut hits = enrolled.filter(|s| s.roll_number.as_deref().map(str::trim) == Some(roll));
    match (hits.next(), hits.next()) {
        (Some(s), None) => Ok(s),
        _ => Err(RowIssue::StudentNotFound(format!("roll number {}", roll))),
    }
}

fn resolve_subject<'a>(row: &ImportRow, subjects: &'a [Subject]) -> Result<&'a Subject, RowIssue> {
    let Some(key) = row.value(&["subject", "subject_code"]) else {
        return Err(RowIssue::Required("subject"));
    };
    subjects
        .iter()
        .find(|s| s.code.eq_ignore_ascii_case(key))
        .or_else(|| subjects.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| RowIssue::SubjectNotFound(key.to_string()))
}

/// Checks one marks-sheet row (`student_id`/`roll_number`, `subject`,
/// `marks`) for `exam`. Only students of the exam's class resolve. A blank
/// mark is accepted as "not entered".
pub fn validate_marks_row(
    row: &ImportRow,
    exam: &Exam,
    subjects: &[Subject],
    students: &[Student],
) -> Result<MarkEntry, Vec<RowIssue>> {
    let student = match resolve_student(row, &exam.class_id, students) {
        Ok(s) => s,
        Err(issue) => return Err(vec![issue]),
    };

    let mut issues = Vec::new();
    let subject = resolve_subject(row, subjects).map_err(|e| issues.push(e)).ok();

    let marks = match row.value(&["marks", "marks_obtained"]) {
        None => None,
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                issues.push(RowIssue::InvalidNumber(raw.to_string()));
                None
            }
        },
    };

    if let (Some(s), Some(v)) = (subject, marks) {
        if v < 0.0 || v > s.full_marks {
            issues.push(RowIssue::OutOfRangeMarks {
                subject: s.name.clone(),
                marks: v,
                full_marks: s.full_marks,
            });
        }
    }

    match subject {
        Some(s) if issues.is_empty() => Ok(MarkEntry {
            student_id: student.id.clone(),
            exam_id: exam.id.clone(),
            subject_id: s.id.clone(),
            marks_obtained: marks,
            grade: None,
        }),
        _ => Err(issues),
    }
}

pub fn validate_marks(
    rows: &[ImportRow],
    exam: &Exam,
    subjects: &[Subject],
    students: &[Student],
) -> ImportReport<MarkEntry> {
    let mut report = ImportReport::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for row in rows {
        let outcome = validate_marks_row(row, exam, subjects, students).and_then(|m| {
            if seen.insert((m.student_id.clone(), m.subject_id.clone())) {
                Ok(m)
            } else {
                Err(vec![RowIssue::DuplicateMarks {
                    student_id: m.student_id,
                    subject: m.subject_id,
                }])
            }
        });
        report.push(row.row_number, outcome);
    }
    info!(
        exam_id = %exam.id,
        valid = report.valid_count,
        invalid = report.invalid_count,
        "marks upload validated"
    );
    report
}
