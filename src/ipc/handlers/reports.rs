use crate::grades::{self, Assessment, StudentGradeRow};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{check_assessments, check_rows, parse_optional_param, parse_param, scale_for};
use crate::ipc::types::{AppState, Request};
use crate::scale::DEFAULT_PASS_THRESHOLD;
use serde_json::json;

/// Class average (ratio of sums), graded percentage, and letter
/// distribution for the report header. Distribution defaults to the
/// coarse report scale, not the gradebook's plus/minus scale.
fn handle_class_statistics(state: &AppState, req: &Request) -> serde_json::Value {
    let assessments: Vec<Assessment> = match parse_param(req, "assessments") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = check_assessments(req, &assessments) {
        return resp;
    }
    let rows: Vec<StudentGradeRow> = match parse_param(req, "rows") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = check_rows(req, &rows) {
        return resp;
    }
    let scale = match scale_for(state, req, "report") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let stats = grades::class_statistics(&rows, &assessments, scale);
    match serde_json::to_value(&stats) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

fn handle_pass_fail(req: &Request) -> serde_json::Value {
    let grades_in: Vec<f64> = match parse_param(req, "grades") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if grades_in.iter().any(|g| !g.is_finite()) {
        return err(&req.id, "bad_params", "grades must be finite numbers", None);
    }
    let threshold: f64 = match parse_optional_param(req, "threshold") {
        Ok(v) => v.unwrap_or(DEFAULT_PASS_THRESHOLD),
        Err(resp) => return resp,
    };
    if !threshold.is_finite() {
        return err(&req.id, "bad_params", "threshold must be a finite number", None);
    }

    let summary = grades::pass_fail_summary(&grades_in, threshold);
    match serde_json::to_value(&summary) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.classStatistics" => Some(handle_class_statistics(state, req)),
        "reports.passFail" => Some(handle_pass_fail(req)),
        _ => None,
    }
}
