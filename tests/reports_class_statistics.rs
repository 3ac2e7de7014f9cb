use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
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
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn approx(value: &serde_json::Value, pointer: &str, expected: f64) {
    let got = value
        .pointer(pointer)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("missing number at {} in {}", pointer, value));
    assert!(
        (got - expected).abs() < 1e-9,
        "{}: expected {}, got {}",
        pointer,
        expected,
        got
    );
}

#[test]
fn class_average_is_ratio_of_sums_not_mean_of_means() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.classStatistics",
        json!({
            "assessments": [
                { "id": "a1", "type": "assignment", "maxScore": 100.0 },
                { "id": "a2", "type": "assignment", "maxScore": 10.0 }
            ],
            "rows": [
                {
                    "studentId": "s1",
                    "displayName": "Perfect, Pat",
                    "scores": { "a1": { "score": 100.0, "maxScore": 100.0 } }
                },
                {
                    "studentId": "s2",
                    "displayName": "Zero, Zed",
                    "scores": { "a2": { "score": 0.0, "maxScore": 10.0 } }
                }
            ]
        }),
    );
    // 100 of 110 points, roughly 90.9; a mean of per-student averages
    // would say 50.
    approx(&result, "/classAverage", (100.0 / 110.0) * 100.0);
    approx(&result, "/gradedPercentage", 50.0);
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn distribution_uses_the_coarse_report_scale_by_default() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.classStatistics",
        json!({
            "assessments": [],
            "rows": [
                { "studentId": "s1", "displayName": "A", "scores": {}, "courseGrade": 93.0 },
                { "studentId": "s2", "displayName": "B", "scores": {}, "courseGrade": 81.5 },
                { "studentId": "s3", "displayName": "C", "scores": {}, "courseGrade": 77.0 },
                { "studentId": "s4", "displayName": "D", "scores": {}, "courseGrade": 70.0 },
                { "studentId": "s5", "displayName": "F", "scores": {}, "courseGrade": 42.0 },
                { "studentId": "s6", "displayName": "N", "scores": {} }
            ]
        }),
    );
    let dist = result
        .get("distribution")
        .and_then(|v| v.as_array())
        .expect("distribution array");
    let buckets: Vec<(String, u64)> = dist
        .iter()
        .map(|b| {
            (
                b.get("letter").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                b.get("count").and_then(|v| v.as_u64()).unwrap_or(0),
            )
        })
        .collect();
    // 77 is a C on the report scale even though the gradebook scale
    // calls it C+; the ungraded sixth row is not bucketed.
    assert_eq!(
        buckets,
        vec![
            ("A".to_string(), 1),
            ("B".to_string(), 1),
            ("C".to_string(), 1),
            ("D".to_string(), 1),
            ("F".to_string(), 1),
        ]
    );
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn empty_roster_reports_zeroes_not_errors() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.classStatistics",
        json!({
            "assessments": [
                { "id": "a1", "type": "assignment", "maxScore": 100.0 }
            ],
            "rows": []
        }),
    );
    approx(&result, "/classAverage", 0.0);
    approx(&result, "/gradedPercentage", 0.0);
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn pass_fail_defaults_to_the_75_threshold() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.passFail",
        json!({ "grades": [91.0, 75.0, 74.99, 60.0] }),
    );
    assert_eq!(result.get("total").and_then(|v| v.as_u64()), Some(4));
    assert_eq!(result.get("passing").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(result.get("failing").and_then(|v| v.as_u64()), Some(2));
    approx(&result, "/passRate", 50.0);
    approx(&result, "/failRate", 50.0);

    // A stricter school can move the bar.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.passFail",
        json!({ "grades": [91.0, 75.0, 74.99, 60.0], "threshold": 90.0 }),
    );
    assert_eq!(result.get("passing").and_then(|v| v.as_u64()), Some(1));
    drop(stdin);
    let _ = child.wait();
}
