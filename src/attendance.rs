use crate::calc::percent_of;
use crate::error::{CalcError, Result};
use crate::model::{AttendanceEntry, AttendanceStatus};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Tally of recorded statuses. `total` counts recorded entries only, never
/// the enrolled roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub leave: u32,
    pub total: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Leave => self.leave += 1,
        }
        self.total += 1;
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.present += other.present;
        self.absent += other.absent;
        self.late += other.late;
        self.leave += other.leave;
        self.total += other.total;
    }
}

/// Present share of recorded entries. Late and leave count toward the
/// denominator only.
pub fn attendance_percentage(counts: &StatusCounts) -> f64 {
    percent_of(counts.present as f64, counts.total as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceBand {
    Good,
    Warning,
    Critical,
}

impl AttendanceBand {
    pub fn from_percentage(p: f64) -> Self {
        if p >= 75.0 {
            AttendanceBand::Good
        } else if p >= 50.0 {
            AttendanceBand::Warning
        } else {
            AttendanceBand::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub percentage: f64,
    pub band: AttendanceBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub overall: StatusCounts,
    pub overall_percentage: f64,
    pub per_student: BTreeMap<String, StudentAttendance>,
    pub per_day: Vec<DailyBreakdown>,
}

/// Summarizes entries dated within `[period_start, period_end]`.
///
/// `per_day` is dense: every calendar day of the period appears, with zero
/// counts where nothing was recorded.
pub fn summarize(
    entries: &[AttendanceEntry],
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<AttendanceSummary> {
    if period_end < period_start {
        return Err(CalcError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }

    let mut per_day: Vec<DailyBreakdown> = period_start
        .iter_days()
        .take_while(|d| *d <= period_end)
        .map(|date| DailyBreakdown {
            date,
            counts: StatusCounts::default(),
            percentage: 0.0,
        })
        .collect();

    let mut overall = StatusCounts::default();
    let mut per_student_counts: BTreeMap<String, StatusCounts> = BTreeMap::new();
    let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();

    for e in entries
        .iter()
        .filter(|e| e.date >= period_start && e.date <= period_end)
    {
        if !seen.insert((e.student_id.as_str(), e.date)) {
            return Err(CalcError::DuplicateAttendance {
                student_id: e.student_id.clone(),
                date: e.date,
            });
        }
        overall.record(e.status);
        per_student_counts
            .entry(e.student_id.clone())
            .or_default()
            .record(e.status);
        let idx = (e.date - period_start).num_days() as usize;
        if let Some(day) = per_day.get_mut(idx) {
            day.counts.record(e.status);
        }
    }

    for day in per_day.iter_mut() {
        day.percentage = attendance_percentage(&day.counts);
    }

    let per_student = per_student_counts
        .into_iter()
        .map(|(id, counts)| {
            let percentage = attendance_percentage(&counts);
            (
                id,
                StudentAttendance {
                    counts,
                    percentage,
                    band: AttendanceBand::from_percentage(percentage),
                },
            )
        })
        .collect();

    Ok(AttendanceSummary {
        period_start,
        period_end,
        overall_percentage: attendance_percentage(&overall),
        overall,
        per_student,
        per_day,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBreakdown {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub percentage: f64,
}

fn bucket_label(date: NaiveDate, bucket: Bucket) -> String {
    match bucket {
        Bucket::Day => date.format("%Y-%m-%d").to_string(),
        Bucket::Week => {
            let w = date.iso_week();
            format!("{}-W{:02}", w.year(), w.week())
        }
        Bucket::Month => date.format("%Y-%m").to_string(),
    }
}

/// Re-aggregates a dense day axis into ISO weeks or calendar months. Bucket
/// edges are clipped to the days present in `per_day`.
pub fn bucket(per_day: &[DailyBreakdown], bucket: Bucket) -> Vec<PeriodBreakdown> {
    let mut out: Vec<PeriodBreakdown> = Vec::new();
    for day in per_day {
        let label = bucket_label(day.date, bucket);
        match out.last_mut() {
            Some(cur) if cur.label == label => {
                cur.end = day.date;
                cur.counts.merge(&day.counts);
            }
            _ => out.push(PeriodBreakdown {
                label,
                start: day.date,
                end: day.date,
                counts: day.counts,
                percentage: 0.0,
            }),
        }
    }
    for p in out.iter_mut() {
        p.percentage = attendance_percentage(&p.counts);
    }
    debug!(buckets = out.len(), ?bucket, "attendance bucketed");
    out
}
