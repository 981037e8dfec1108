#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_taskcheckd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn taskcheckd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
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
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Two groups, three students, five rows. Mirrors the shapes the checker
/// run emits: one task result has no deadline check at all.
pub fn write_sample_report(dir: &Path) -> PathBuf {
    let student_alice = json!({
        "studentName": "Alice Ivanova",
        "repository": "https://git.example/alice",
        "nickname": "alice",
        "groupName": "22201",
        "commitsCheckResult": {
            "totalCommits": 40, "totalActiveWeeks": 8,
            "maximumCommitsPerWeek": 9, "totalWeeks": 12,
            "commitsPerWeekList": [
                { "week": "2024-W06", "commits": 9 },
                { "week": "2024-W07", "commits": 4 }
            ]
        }
    });
    let student_boris = json!({
        "studentName": "Boris Petrov",
        "repository": "https://git.example/boris",
        "nickname": "boris",
        "groupName": "22201",
        "commitsCheckResult": {
            "totalCommits": 12, "totalActiveWeeks": 4,
            "maximumCommitsPerWeek": 5, "totalWeeks": 12,
            "commitsPerWeekList": []
        }
    });
    let student_vera = json!({
        "studentName": "Vera Sidorova",
        "repository": "https://git.example/vera",
        "nickname": "vera",
        "groupName": "22202",
        "commitsCheckResult": {
            "totalCommits": 55, "totalActiveWeeks": 10,
            "maximumCommitsPerWeek": 12, "totalWeeks": 12,
            "commitsPerWeekList": []
        }
    });

    let task_lab1 = json!({
        "id": "lab1", "title": "Lab 1", "points": 1,
        "softDeadline": "2024-02-01", "hardDeadline": "2024-02-15"
    });
    let task_lab2 = json!({
        "id": "lab2", "title": "Lab 2", "points": 1,
        "softDeadline": "2024-03-01", "hardDeadline": "2024-03-15"
    });

    let report = json!({
        "taskRunnerResults": [
            {
                "student": student_alice.clone(),
                "tasksResults": [
                    {
                        "build": true, "docs": true,
                        "passedTests": 10, "totalTests": 10,
                        "failedTests": 0, "ignoredTests": 0,
                        "deadlinesCheckResult": {
                            "softDeadlinePass": true, "hardDeadlinePass": true
                        },
                        "task": task_lab1.clone(),
                        "points": 3.0
                    },
                    {
                        "build": true, "docs": false,
                        "passedTests": 4, "totalTests": 6,
                        "failedTests": 2, "ignoredTests": 0,
                        "task": task_lab2.clone(),
                        "points": 2.0
                    }
                ]
            },
            {
                "student": student_boris.clone(),
                "tasksResults": [
                    {
                        "build": false, "docs": false,
                        "passedTests": 0, "totalTests": 6,
                        "failedTests": 6, "ignoredTests": 0,
                        "deadlinesCheckResult": {
                            "softDeadlinePass": false, "hardDeadlinePass": true
                        },
                        "task": task_lab1.clone(),
                        "points": 1.0
                    },
                    {
                        "build": true, "docs": true,
                        "passedTests": 6, "totalTests": 6,
                        "failedTests": 0, "ignoredTests": 0,
                        "deadlinesCheckResult": {
                            "softDeadlinePass": true, "hardDeadlinePass": true
                        },
                        "task": task_lab2.clone(),
                        "points": 2.5
                    }
                ]
            },
            {
                "student": student_vera.clone(),
                "tasksResults": [
                    {
                        "build": true, "docs": true,
                        "passedTests": 9, "totalTests": 10,
                        "failedTests": 1, "ignoredTests": 0,
                        "deadlinesCheckResult": {
                            "softDeadlinePass": true, "hardDeadlinePass": true
                        },
                        "task": task_lab1.clone(),
                        "points": 4.0
                    }
                ]
            }
        ],
        "tasks": [task_lab1.clone(), task_lab2.clone()],
        "groups": [
            { "name": "22201", "students": [student_alice.clone(), student_boris.clone()] },
            { "name": "22202", "students": [student_vera.clone()] }
        ],
        "students": [student_alice, student_boris, student_vera],
        "additionalSettings": {
            "marksMap": { "satisfactory": 4, "good": 6, "excellent": 8 }
        }
    });

    let path = dir.join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&report).expect("json")).expect("write");
    path
}

pub fn open_sample_report(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    dir: &Path,
) -> serde_json::Value {
    let report_path = write_sample_report(dir);
    request_ok(
        stdin,
        reader,
        "open",
        "report.open",
        json!({ "path": report_path.to_string_lossy() }),
    )
}
