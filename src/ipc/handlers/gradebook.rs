use crate::grades::{
    self, Assessment, AssessmentScore, AssessmentType, StudentGradeRow, TypeWeight,
};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    check_assessments, check_rows, check_scores, check_weights, parse_optional_param, parse_param,
    scale_for,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::collections::HashMap;

fn handle_assessment_types(req: &Request) -> serde_json::Value {
    let types: Vec<serde_json::Value> = AssessmentType::BUILT_IN
        .iter()
        .map(|t| {
            json!({
                "type": t.as_str(),
                "label": t.label(),
                "icon": t.icon(),
            })
        })
        .collect();
    ok(&req.id, json!({ "types": types }))
}

fn parse_weights(req: &Request) -> Result<Vec<TypeWeight>, serde_json::Value> {
    let weights: Vec<TypeWeight> = parse_optional_param(req, "weights")?.unwrap_or_default();
    check_weights(req, &weights)?;
    Ok(weights)
}

/// Per-student weighted averages and letter grades for the gradebook
/// table: one entry per row, with the per-type breakdown the weight
/// modal displays (including which assessments the drop policy removed).
fn handle_summary(state: &AppState, req: &Request) -> serde_json::Value {
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
    let weights = match parse_weights(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let scale = match scale_for(state, req, "plusMinus") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let per_student: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let average = grades::weighted_average(&row.scores, &assessments, &weights);
            let letter = average.map(|v| scale.letter_for(v).to_string());
            let graded_count = assessments
                .iter()
                .filter(|a| row.scores.get(&a.id).and_then(|s| s.score).is_some())
                .count();
            let breakdown = grades::type_breakdown(&row.scores, &assessments, &weights);
            json!({
                "studentId": row.student_id,
                "displayName": row.display_name,
                "externalId": row.external_id,
                "weightedAverage": average,
                "letterGrade": letter,
                "gradedCount": graded_count,
                "assessmentCount": assessments.len(),
                "breakdown": breakdown,
            })
        })
        .collect();

    ok(&req.id, json!({ "perStudent": per_student }))
}

/// The soft sum-to-100 rule lives here at the caller boundary; the
/// engine itself re-normalizes and never requires it.
fn handle_validate_weights(req: &Request) -> serde_json::Value {
    let weights: Vec<TypeWeight> = match parse_param(req, "weights") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = check_weights(req, &weights) {
        return resp;
    }
    let total: f64 = weights.iter().map(|w| w.weight_percent).sum();
    if (total - 100.0).abs() > 0.01 {
        return err(
            &req.id,
            "weights_not_100",
            format!("weights must sum to 100%, got {}", total),
            None,
        );
    }
    ok(&req.id, json!({ "totalWeight": total }))
}

/// Weighted average plus finalization: 2-decimal rounding, letter, GPA
/// and quality points. A `null` course grade means nothing is graded yet.
fn handle_course_grade(state: &AppState, req: &Request) -> serde_json::Value {
    let assessments: Vec<Assessment> = match parse_param(req, "assessments") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = check_assessments(req, &assessments) {
        return resp;
    }
    let scores: HashMap<String, AssessmentScore> = match parse_param(req, "scores") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = check_scores(req, &scores) {
        return resp;
    }
    let weights = match parse_weights(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let credit_hours: f64 = match parse_optional_param(req, "creditHours") {
        Ok(v) => v.unwrap_or(3.0),
        Err(resp) => return resp,
    };
    if !credit_hours.is_finite() || credit_hours < 0.0 {
        return err(
            &req.id,
            "bad_params",
            "creditHours must be a non-negative number",
            None,
        );
    }
    let scale = match scale_for(state, req, "plusMinus") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let course_grade = grades::weighted_average(&scores, &assessments, &weights)
        .map(|avg| grades::finalize_course_grade(avg, credit_hours, scale));
    ok(&req.id, json!({ "courseGrade": course_grade }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "gradebook.assessmentTypes" => Some(handle_assessment_types(req)),
        "gradebook.summary" => Some(handle_summary(state, req)),
        "gradebook.validateWeights" => Some(handle_validate_weights(req)),
        "gradebook.courseGrade" => Some(handle_course_grade(state, req)),
        _ => None,
    }
}
