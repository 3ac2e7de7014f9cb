use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Pass/fail cutoff used by report summaries (inclusive).
pub const DEFAULT_PASS_THRESHOLD: f64 = 75.0;

#[derive(Debug, Clone, Serialize)]
pub struct ScaleError {
    pub code: String,
    pub message: String,
}

impl ScaleError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ScaleError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub min_percent: f64,
    pub letter: String,
}

/// A monotonic step function from percentage to letter grade: the first
/// band (checked in descending bound order) whose inclusive lower bound
/// the value meets wins, and `fallback` covers everything below the last
/// band. Percentages above 100 simply land in the top band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingScale {
    bands: Vec<GradeBand>,
    fallback: String,
}

impl GradingScale {
    pub fn new(bands: Vec<GradeBand>, fallback: String) -> Result<Self, ScaleError> {
        if bands.is_empty() {
            return Err(ScaleError::new(
                "bad_scale",
                "a grading scale needs at least one band",
            ));
        }
        if fallback.trim().is_empty() {
            return Err(ScaleError::new(
                "bad_scale",
                "fallback letter must not be empty",
            ));
        }
        for band in &bands {
            if !band.min_percent.is_finite() {
                return Err(ScaleError::new(
                    "bad_scale",
                    "band bounds must be finite numbers",
                ));
            }
            if band.letter.trim().is_empty() {
                return Err(ScaleError::new(
                    "bad_scale",
                    "band letters must not be empty",
                ));
            }
        }
        for pair in bands.windows(2) {
            if pair[0].min_percent <= pair[1].min_percent {
                return Err(ScaleError::new(
                    "bad_scale",
                    format!(
                        "band bounds must strictly descend: {} then {}",
                        pair[0].min_percent, pair[1].min_percent
                    ),
                ));
            }
        }
        Ok(Self { bands, fallback })
    }

    /// The fine-grained plus/minus scale used for gradebook display.
    pub fn plus_minus() -> Self {
        let bands = [
            (97.0, "A+"),
            (93.0, "A"),
            (90.0, "A-"),
            (87.0, "B+"),
            (83.0, "B"),
            (80.0, "B-"),
            (77.0, "C+"),
            (73.0, "C"),
            (70.0, "C-"),
            (67.0, "D+"),
            (63.0, "D"),
            (60.0, "D-"),
        ]
        .iter()
        .map(|(min_percent, letter)| GradeBand {
            min_percent: *min_percent,
            letter: letter.to_string(),
        })
        .collect();
        Self {
            bands,
            fallback: "F".to_string(),
        }
    }

    /// The coarse scale used by report summaries. Distinct from
    /// `plus_minus` (note the 75 C cutoff); the two must never be
    /// conflated.
    pub fn report() -> Self {
        let bands = [(90.0, "A"), (80.0, "B"), (75.0, "C"), (70.0, "D")]
            .iter()
            .map(|(min_percent, letter)| GradeBand {
                min_percent: *min_percent,
                letter: letter.to_string(),
            })
            .collect();
        Self {
            bands,
            fallback: "F".to_string(),
        }
    }

    pub fn letter_for(&self, numeric: f64) -> &str {
        for band in &self.bands {
            if numeric >= band.min_percent {
                return &band.letter;
            }
        }
        &self.fallback
    }

    /// All letters in descending-quality order, fallback last.
    pub fn letters(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.bands.iter().map(|b| b.letter.as_str()).collect();
        out.push(&self.fallback);
        out
    }

    /// Index into `letters()` for a numeric grade.
    pub fn band_index(&self, numeric: f64) -> usize {
        for (i, band) in self.bands.iter().enumerate() {
            if numeric >= band.min_percent {
                return i;
            }
        }
        self.bands.len()
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

/// GPA points on the fixed 4.0 table. Letters outside the table map to
/// 0.0 rather than failing, matching the grade-store behavior.
pub fn gpa_points(letter: &str) -> f64 {
    match letter {
        "A+" | "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "D-" => 0.7,
        _ => 0.0,
    }
}

/// Built-in registry: the gradebook scale under `plusMinus`, the report
/// scale under `report`.
pub fn default_registry() -> HashMap<String, GradingScale> {
    let mut scales = HashMap::new();
    scales.insert("plusMinus".to_string(), GradingScale::plus_minus());
    scales.insert("report".to_string(), GradingScale::report());
    scales
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScaleFileEntry {
    bands: Vec<GradeBand>,
    fallback: String,
}

/// Load school-configured scales from a JSON file of
/// `{ "<key>": { "bands": [{"minPercent", "letter"}, ...], "fallback" } }`.
/// Each entry goes through the same validation as `GradingScale::new`.
pub fn load_scales_file(path: &Path) -> anyhow::Result<HashMap<String, GradingScale>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scales file {}", path.display()))?;
    let raw: HashMap<String, ScaleFileEntry> =
        serde_json::from_str(&text).with_context(|| "parse scales file json")?;

    let mut out = HashMap::with_capacity(raw.len());
    for (key, entry) in raw {
        let scale = GradingScale::new(entry.bands, entry.fallback)
            .map_err(|e| anyhow::anyhow!("scale {key}: {e}"))?;
        out.insert(key, scale);
    }
    Ok(out)
}
