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
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn facilitator_stats_follow_roster_and_sort_best_first() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grading.facilitatorStats",
        json!({
            "subjects": ["Mathematics", "Science", "French"],
            "students": [
                { "id": 1, "name": "A", "scores": { "Mathematics": 90, "Science": 50, "French": 70 } },
                { "id": 2, "name": "B", "scores": { "Mathematics": 50, "Science": 50, "French": 70 } },
                { "id": 3, "name": "C", "scores": { "Mathematics": 10, "Science": 50, "French": 70 } }
            ],
            "settings": {
                "staffList": [
                    { "name": "Mrs. Asante", "role": "Subject Facilitator", "subjects": ["Mathematics"] }
                ],
                "facilitatorMapping": { "Mathematics": "Mr. Ignored", "Science": "Mr. Boateng" }
            }
        }),
    );

    let stats = result["facilitators"].as_array().expect("facilitators");
    assert_eq!(stats.len(), 3);
    let names: Vec<(&str, &str)> = stats
        .iter()
        .map(|s| {
            (
                s["facilitatorName"].as_str().unwrap_or(""),
                s["subject"].as_str().unwrap_or(""),
            )
        })
        .collect();
    // Maths grades B2, C4, D7: 1 - 13/27 = 51.85%.
    // Science and French have no variance: all C4, 1 - 12/27 = 55.56%.
    assert_eq!(
        names,
        vec![
            ("Mr. Boateng", "Science"),
            ("TBA", "French"),
            ("Mrs. Asante", "Mathematics"),
        ]
    );

    let maths = &stats[2];
    assert_eq!(maths["studentCount"], 3);
    assert_eq!(maths["totalGradeValue"], 13);
    assert_eq!(maths["gradeCounts"]["B2"], 1);
    assert_eq!(maths["gradeCounts"]["C4"], 1);
    assert_eq!(maths["gradeCounts"]["D7"], 1);
    assert_eq!(maths["gradeCounts"]["A1"], 0);
    assert_eq!(maths["performancePercentage"].as_f64(), Some(51.85));
    assert_eq!(maths["performanceGrade"], "C4");

    let science = &stats[0];
    assert_eq!(science["performancePercentage"].as_f64(), Some(55.56));
    assert_eq!(science["averageGradeValue"].as_f64(), Some(4.0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn report_bundles_every_stage() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grading.report",
        json!({
            "subjects": ["Mathematics"],
            "students": [
                { "id": 1, "name": "A", "scores": { "Mathematics": 64 } },
                { "id": 2, "name": "B", "scores": { "Mathematics": 36 } }
            ]
        }),
    );
    assert!(result["statistics"].is_object());
    assert_eq!(result["students"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(result["summary"]["studentCount"], 2);
    let facilitators = result["facilitators"].as_array().expect("facilitators");
    assert_eq!(facilitators.len(), 1);
    assert_eq!(facilitators[0]["facilitatorName"], "TBA");
    assert_eq!(facilitators[0]["studentCount"], 2);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn empty_class_yields_no_facilitator_stats() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grading.facilitatorStats",
        json!({ "subjects": ["Mathematics"], "students": [] }),
    );
    assert_eq!(result["facilitators"], json!([]));

    drop(stdin);
    let _ = child.wait();
}
