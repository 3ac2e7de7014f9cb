use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    let mut scale_keys: Vec<&str> = state.scales.keys().map(|k| k.as_str()).collect();
    scale_keys.sort_unstable();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "scales": scale_keys,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        _ => None,
    }
}
