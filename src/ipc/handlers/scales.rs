use crate::ipc::error::{err, ok};
use crate::ipc::helpers::parse_param;
use crate::ipc::types::{AppState, Request};
use crate::scale::{self, GradeBand, GradingScale};
use serde_json::json;
use std::path::PathBuf;

fn scale_json(key: &str, scale: &GradingScale) -> serde_json::Value {
    json!({
        "key": key,
        "bands": scale.bands(),
        "fallback": scale.fallback(),
    })
}

fn handle_list(state: &AppState, req: &Request) -> serde_json::Value {
    let mut keys: Vec<&String> = state.scales.keys().collect();
    keys.sort_unstable();
    let scales: Vec<serde_json::Value> = keys
        .into_iter()
        .map(|k| scale_json(k, &state.scales[k]))
        .collect();
    ok(&req.id, json!({ "scales": scales }))
}

fn handle_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key: String = match parse_param(req, "key") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if key.trim().is_empty() {
        return err(&req.id, "bad_params", "key must not be empty", None);
    }
    let bands: Vec<GradeBand> = match parse_param(req, "bands") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fallback: String = match parse_param(req, "fallback") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match GradingScale::new(bands, fallback) {
        Ok(scale) => {
            let replaced = state.scales.insert(key.clone(), scale).is_some();
            ok(&req.id, json!({ "key": key, "replaced": replaced }))
        }
        Err(e) => err(&req.id, &e.code, e.message, None),
    }
}

fn handle_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path: PathBuf = match parse_param::<String>(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };
    match scale::load_scales_file(&path) {
        Ok(loaded) => {
            let mut keys: Vec<String> = loaded.keys().cloned().collect();
            keys.sort_unstable();
            state.scales.extend(loaded);
            ok(&req.id, json!({ "loaded": keys }))
        }
        Err(e) => err(&req.id, "scales_load_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scales.list" => Some(handle_list(state, req)),
        "scales.register" => Some(handle_register(state, req)),
        "scales.load" => Some(handle_load(state, req)),
        _ => None,
    }
}
