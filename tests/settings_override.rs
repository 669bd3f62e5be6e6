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

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
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
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false), "{}", value);
    value["error"]["code"].as_str().unwrap_or("").to_string()
}

fn class_params() -> serde_json::Value {
    json!({
        "subjects": ["Mathematics", "French", "ICT", "Music"],
        "students": [
            { "id": 1, "name": "A", "scores": { "Mathematics": 90, "French": 20, "ICT": 30, "Music": 95 } },
            { "id": 2, "name": "B", "scores": { "Mathematics": 60, "French": 60, "ICT": 60, "Music": 60 } },
            { "id": 3, "name": "C", "scores": { "Mathematics": 30, "French": 90, "ICT": 80, "Music": 25 } }
        ]
    })
}

fn aggregates_by_id(result: &serde_json::Value) -> Vec<(i64, i64)> {
    let mut out: Vec<(i64, i64)> = result["students"]
        .as_array()
        .expect("students")
        .iter()
        .map(|s| {
            (
                s["id"].as_i64().unwrap_or(-1),
                s["bestSixAggregate"].as_i64().unwrap_or(-1),
            )
        })
        .collect();
    out.sort();
    out
}

#[test]
fn session_settings_update_and_reset() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let initial = request_ok(&mut stdin, &mut reader, "1", "settings.get", json!({}));
    let core = initial["settings"]["coreSubjects"].as_array().expect("core");
    assert!(core.iter().any(|v| v.as_str() == Some("Mathematics")));
    assert_eq!(
        initial["settings"]["defaultRecommendation"],
        "Recommended to attend extra classes for weak areas."
    );

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "settings.update",
        json!({
            "patch": {
                "facilitatorMapping": { "Music": "Mr. Addo" },
                "defaultRecommendation": "Read widely."
            }
        }),
    );
    assert_eq!(updated["settings"]["facilitatorMapping"]["Music"], "Mr. Addo");

    let graded = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grading.processClass",
        class_params(),
    );
    let first = &graded["students"][0];
    assert_eq!(first["recommendation"], "Read widely.");
    let music = first["subjects"]
        .as_array()
        .expect("subjects")
        .iter()
        .find(|s| s["subject"] == "Music")
        .cloned()
        .expect("music");
    assert_eq!(music["facilitator"], "Mr. Addo");

    let reset = request_ok(&mut stdin, &mut reader, "4", "settings.reset", json!({}));
    assert_eq!(reset, initial);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn per_call_override_does_not_touch_session() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let baseline = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grading.processClass",
        class_params(),
    );

    // With no core subjects, all four subjects compete for two elective picks.
    let mut params = class_params();
    params["settings"] = json!({ "coreSubjects": [] });
    let overridden = request_ok(&mut stdin, &mut reader, "2", "grading.processClass", params);
    for s in overridden["students"].as_array().expect("students") {
        assert_eq!(s["bestCoreSubjects"].as_array().map(|a| a.len()), Some(0));
        assert_eq!(s["bestElectiveSubjects"].as_array().map(|a| a.len()), Some(2));
    }
    for s in baseline["students"].as_array().expect("students") {
        assert_eq!(s["bestCoreSubjects"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(s["bestElectiveSubjects"].as_array().map(|a| a.len()), Some(2));
    }

    let again = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grading.processClass",
        class_params(),
    );
    assert_eq!(aggregates_by_id(&again), aggregates_by_id(&baseline));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn grading_remarks_override_changes_category_text() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let mut params = class_params();
    params["settings"] = json!({ "gradingRemarks": { "C4": "Average" } });
    let graded = request_ok(&mut stdin, &mut reader, "1", "grading.processClass", params);
    for s in graded["students"].as_array().expect("students") {
        for sub in s["subjects"].as_array().expect("subjects") {
            if sub["grade"] == "C4" {
                assert_eq!(sub["gradeCategory"], "Average");
            }
            if sub["grade"] == "A1" {
                // Omitted from the table: default phrase.
                assert_eq!(sub["gradeCategory"], "Excellent");
            }
        }
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_patches_are_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    assert_eq!(
        request_err(&mut stdin, &mut reader, "1", "settings.update", json!({})),
        "bad_params"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "2",
            "settings.update",
            json!({ "patch": { "coreSubject": ["Mathematics"] } })
        ),
        "bad_params"
    );
    let mut params = class_params();
    params["settings"] = json!({ "staffList": "nobody" });
    assert_eq!(
        request_err(&mut stdin, &mut reader, "3", "grading.processClass", params),
        "bad_params"
    );

    drop(stdin);
    let _ = child.wait();
}
