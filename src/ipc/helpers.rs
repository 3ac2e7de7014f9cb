use crate::grades::{Assessment, AssessmentScore, StudentGradeRow, TypeWeight};
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::scale::GradingScale;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::collections::HashSet;

pub fn parse_param<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, serde_json::Value> {
    let Some(raw) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid {}: {}", key, e), None))
}

pub fn parse_optional_param<T: DeserializeOwned>(
    req: &Request,
    key: &str,
) -> Result<Option<T>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| err(&req.id, "bad_params", format!("invalid {}: {}", key, e), None)),
    }
}

/// Resolve `params.scale` against the registry, falling back to the
/// given built-in key when the caller names none.
pub fn scale_for<'a>(
    state: &'a AppState,
    req: &Request,
    default_key: &str,
) -> Result<&'a GradingScale, serde_json::Value> {
    let key = match req.params.get("scale") {
        None => default_key,
        Some(v) if v.is_null() => default_key,
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(err(&req.id, "bad_params", "scale must be a string key", None));
            };
            s
        }
    };
    state.scales.get(key).ok_or_else(|| {
        err(
            &req.id,
            "unknown_scale",
            format!("no grading scale registered under '{}'", key),
            None,
        )
    })
}

// Boundary sanitation: the engine assumes well-formed numbers, so every
// request-supplied record is checked here before it reaches the core.

pub fn check_assessments(req: &Request, assessments: &[Assessment]) -> Result<(), serde_json::Value> {
    let mut seen = HashSet::new();
    for a in assessments {
        if a.id.trim().is_empty() {
            return Err(err(&req.id, "bad_params", "assessment ids must not be empty", None));
        }
        if !seen.insert(a.id.as_str()) {
            return Err(err(
                &req.id,
                "bad_params",
                format!("duplicate assessment id '{}'", a.id),
                None,
            ));
        }
        if !a.max_score.is_finite() {
            return Err(err(
                &req.id,
                "bad_params",
                format!("assessment '{}' has a non-finite maxScore", a.id),
                None,
            ));
        }
    }
    Ok(())
}

pub fn check_scores(
    req: &Request,
    scores: &HashMap<String, AssessmentScore>,
) -> Result<(), serde_json::Value> {
    for (id, sd) in scores {
        if !sd.max_score.is_finite() || sd.max_score < 0.0 {
            return Err(err(
                &req.id,
                "bad_params",
                format!("score for '{}' has an invalid maxScore", id),
                None,
            ));
        }
        if let Some(raw) = sd.score {
            if !raw.is_finite() || raw < 0.0 {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("score for '{}' must be a non-negative number", id),
                    None,
                ));
            }
        }
    }
    Ok(())
}

pub fn check_rows(req: &Request, rows: &[StudentGradeRow]) -> Result<(), serde_json::Value> {
    for row in rows {
        if row.student_id.trim().is_empty() {
            return Err(err(&req.id, "bad_params", "studentId must not be empty", None));
        }
        check_scores(req, &row.scores)?;
        if let Some(g) = row.course_grade {
            if !g.is_finite() {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("courseGrade for '{}' must be finite", row.student_id),
                    None,
                ));
            }
        }
    }
    Ok(())
}

pub fn check_weights(req: &Request, weights: &[TypeWeight]) -> Result<(), serde_json::Value> {
    let mut seen = HashSet::new();
    for w in weights {
        if !seen.insert(w.kind.clone()) {
            return Err(err(
                &req.id,
                "bad_params",
                format!("duplicate weight entry for type '{}'", w.kind.as_str()),
                None,
            ));
        }
        if !w.weight_percent.is_finite() || !(0.0..=100.0).contains(&w.weight_percent) {
            return Err(err(
                &req.id,
                "bad_params",
                format!(
                    "weightPercent for '{}' must be within [0, 100]",
                    w.kind.as_str()
                ),
                None,
            ));
        }
    }
    Ok(())
}
