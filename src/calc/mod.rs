pub mod combined;
pub mod exam;
pub mod grade;
pub mod reports;
pub mod subject;

pub use combined::{combine, CombinedReport, ExamSheet};
pub use exam::{aggregate_exam, ExamResult};
pub use grade::{grade, Grade};
pub use subject::{assess, SubjectResult};

/// `100 * part / whole`, or 0 when there is nothing to divide by.
/// Never yields NaN or infinity.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && whole.is_finite() && part.is_finite() {
        part / whole * 100.0
    } else {
        0.0
    }
}
