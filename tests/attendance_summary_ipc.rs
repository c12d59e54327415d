use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .env_remove("SCHOOLD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn entry(student: &str, section: &str, date: &str, status: &str) -> serde_json::Value {
    json!({
        "studentId": student,
        "classId": "c10",
        "sectionId": section,
        "date": date,
        "status": status
    })
}

fn u(v: &serde_json::Value, key: &str) -> u64 {
    v.get(key).and_then(|x| x.as_u64()).unwrap_or(u64::MAX)
}

#[test]
fn twenty_entries_give_seventy_five_percent() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let mut entries = Vec::new();
    let statuses = std::iter::repeat("present")
        .take(15)
        .chain(std::iter::repeat("absent").take(3))
        .chain(["late", "leave"]);
    for (i, status) in statuses.enumerate() {
        entries.push(entry(&format!("s{}", i), "A", "2026-05-04", status));
    }

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.summary",
        json!({
            "entries": entries,
            "periodStart": "2026-05-04",
            "periodEnd": "2026-05-04"
        }),
    );
    let overall = &summary["overall"];
    assert_eq!(u(overall, "present"), 15);
    assert_eq!(u(overall, "absent"), 3);
    assert_eq!(u(overall, "late"), 1);
    assert_eq!(u(overall, "leave"), 1);
    assert_eq!(u(overall, "total"), 20);
    assert_eq!(summary.get("overallPercentage").and_then(|v| v.as_f64()), Some(75.0));
}

#[test]
fn day_axis_is_dense_and_buckets_by_month() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.summary",
        json!({
            "entries": [
                entry("s1", "A", "2026-05-29", "present"),
                entry("s2", "A", "2026-05-29", "absent"),
                entry("s1", "A", "2026-06-02", "present"),
                entry("s9", "B", "2026-06-01", "absent")
            ],
            "periodStart": "2026-05-29",
            "periodEnd": "2026-06-02",
            "sectionId": "A",
            "bucket": "month"
        }),
    );

    let days = summary["perDay"].as_array().expect("perDay");
    assert_eq!(days.len(), 5);
    let zero_days = days.iter().filter(|d| u(d, "total") == 0).count();
    assert_eq!(zero_days, 3);
    assert_eq!(days[0].get("date").and_then(|v| v.as_str()), Some("2026-05-29"));
    assert_eq!(days[4].get("date").and_then(|v| v.as_str()), Some("2026-06-02"));

    // Section B entry filtered out before summarizing.
    assert!(summary["perStudent"].get("s9").is_none());
    let s1 = &summary["perStudent"]["s1"];
    assert_eq!(u(s1, "present"), 2);
    assert_eq!(s1.get("band").and_then(|v| v.as_str()), Some("good"));
    let s2 = &summary["perStudent"]["s2"];
    assert_eq!(s2.get("band").and_then(|v| v.as_str()), Some("critical"));

    assert_eq!(summary.get("bucket").and_then(|v| v.as_str()), Some("month"));
    let months = summary["perPeriod"].as_array().expect("perPeriod");
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].get("label").and_then(|v| v.as_str()), Some("2026-05"));
    assert_eq!(u(&months[0], "total"), 2);
    assert_eq!(months[1].get("label").and_then(|v| v.as_str()), Some("2026-06"));
    assert_eq!(months[1].get("percentage").and_then(|v| v.as_f64()), Some(100.0));
}

#[test]
fn reversed_period_and_duplicates_are_errors() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let reversed = request(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.summary",
        json!({ "entries": [], "periodStart": "2026-05-10", "periodEnd": "2026-05-01" }),
    );
    assert_eq!(
        reversed.get("error").and_then(|e| e.get("code")).and_then(|v| v.as_str()),
        Some("invalid_period")
    );

    let dup = request(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.summary",
        json!({
            "entries": [
                entry("s1", "A", "2026-05-04", "present"),
                entry("s1", "A", "2026-05-04", "late")
            ],
            "periodStart": "2026-05-01",
            "periodEnd": "2026-05-10"
        }),
    );
    assert_eq!(
        dup.get("error").and_then(|e| e.get("code")).and_then(|v| v.as_str()),
        Some("duplicate_attendance")
    );
}
