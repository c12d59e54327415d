use crate::calc::grade;
use crate::ipc::error::{parse_params, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde::Deserialize;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(
        &req.id,
        Ok(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "importMaxRows": state.config.import.max_rows,
        })),
    )
}

#[derive(Deserialize)]
struct GradeLookupParams {
    percentage: f64,
}

fn grades_lookup(req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p: GradeLookupParams = parse_params(&req.params)?;
    let g = grade(p.percentage)?;
    Ok(json!({ "percentage": p.percentage, "grade": g }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "grades.lookup" => Some(respond(&req.id, grades_lookup(req))),
        _ => None,
    }
}
