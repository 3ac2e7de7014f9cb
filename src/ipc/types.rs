use crate::scale::{self, GradingScale};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    /// Registered grading scales, keyed by the name callers pass as
    /// `params.scale`. Seeded with the two built-ins.
    pub scales: HashMap<String, GradingScale>,
}

impl AppState {
    pub fn with_default_scales() -> Self {
        Self {
            scales: scale::default_registry(),
        }
    }
}
