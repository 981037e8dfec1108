use crate::calc::RowTable;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;
use std::path::PathBuf;

fn handle_report_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = path else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match report::load_report(&path) {
        Ok(loaded) => {
            let table = RowTable::flatten(&loaded);
            let result = json!({
                "students": loaded.task_runner_results.len(),
                "tasks": loaded.tasks.len(),
                "groups": loaded.groups.len(),
                "rows": table.rows.len(),
            });
            state.report = Some(loaded);
            state.table = Some(table);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, "report_load_failed", format!("{e:#}"), None),
    }
}

fn handle_report_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(rep) = state.report.as_ref() else {
        return err(&req.id, "no_report", "open a report first", None);
    };
    let row_count = state.table.as_ref().map(|t| t.rows.len()).unwrap_or(0);
    ok(
        &req.id,
        json!({
            "students": rep.task_runner_results.len(),
            "tasks": rep.tasks.len(),
            "groups": rep.groups.len(),
            "rows": row_count,
            "marksMap": rep.marks_map(),
        }),
    )
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(rep) = state.report.as_ref() else {
        return err(&req.id, "no_report", "open a report first", None);
    };
    let Some(nickname) = req.params.get("nickname").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing nickname", None);
    };
    match rep.student_by_nickname(nickname) {
        Some(student) => ok(&req.id, json!({ "student": student })),
        // Recoverable: the shell renders a placeholder cell.
        None => err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "nickname": nickname })),
        ),
    }
}

fn handle_groups_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(rep) = state.report.as_ref() else {
        return err(&req.id, "no_report", "open a report first", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    match rep.group_by_name(name) {
        Some(group) => ok(&req.id, json!({ "group": group })),
        None => err(
            &req.id,
            "not_found",
            "group not found",
            Some(json!({ "name": name })),
        ),
    }
}

fn handle_tasks_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(rep) = state.report.as_ref() else {
        return err(&req.id, "no_report", "open a report first", None);
    };
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match rep.task_by_id(id) {
        Some(task) => ok(&req.id, json!({ "task": task })),
        None => err(
            &req.id,
            "not_found",
            "task not found",
            Some(json!({ "id": id })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.open" => Some(handle_report_open(state, req)),
        "report.summary" => Some(handle_report_summary(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "groups.get" => Some(handle_groups_get(state, req)),
        "tasks.get" => Some(handle_tasks_get(state, req)),
        _ => None,
    }
}
