use crate::attendance::{bucket, summarize, Bucket};
use crate::ipc::error::{parse_params, respond, to_result, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceEntry;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryParams {
    #[serde(default)]
    entries: Vec<AttendanceEntry>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    class_id: Option<String>,
    section_id: Option<String>,
    #[serde(default)]
    bucket: Bucket,
}

fn attendance_summary(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: SummaryParams = parse_params(&req.params)?;

    let scoped: Vec<AttendanceEntry> = p
        .entries
        .into_iter()
        .filter(|e| p.class_id.as_ref().map(|c| &e.class_id == c).unwrap_or(true))
        .filter(|e| {
            p.section_id
                .as_ref()
                .map(|s| e.section_id.as_ref() == Some(s))
                .unwrap_or(true)
        })
        .collect();

    let summary = summarize(&scoped, p.period_start, p.period_end)?;
    let buckets = bucket(&summary.per_day, p.bucket);
    let mut out = to_result(&summary)?;
    out["bucket"] = json!(match p.bucket {
        Bucket::Day => "day",
        Bucket::Week => "week",
        Bucket::Month => "month",
    });
    out["perPeriod"] = to_result(&buckets)?;
    Ok(out)
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.summary" => Some(respond(&req.id, attendance_summary(req))),
        _ => None,
    }
}
