use crate::import::{parse_table, validate_marks, validate_roster};
use crate::ipc::error::{parse_params, respond, to_result, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Exam, Student, Subject};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterParams {
    csv: String,
}

fn import_roster(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: RosterParams = parse_params(&req.params)?;
    let rows = parse_table(&p.csv, state.config.import.max_rows)?;
    to_result(&validate_roster(&rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarksParams {
    csv: String,
    exam: Exam,
    subjects: Vec<Subject>,
    students: Vec<Student>,
}

fn import_marks(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: MarksParams = parse_params(&req.params)?;
    let rows = parse_table(&p.csv, state.config.import.max_rows)?;
    to_result(&validate_marks(&rows, &p.exam, &p.subjects, &p.students))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let outcome = match req.method.as_str() {
        "import.roster" => import_roster(state, req),
        "import.marks" => import_marks(state, req),
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
