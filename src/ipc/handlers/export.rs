use crate::export::export_rows;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_table_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(table) = state.table.as_ref() else {
        return err(&req.id, "no_report", "open a report first", None);
    };
    let dir = req
        .params
        .get("dir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(dir) = dir else {
        return err(&req.id, "bad_params", "missing params.dir", None);
    };

    match export_rows(table, &dir) {
        Ok(path) => ok(
            &req.id,
            json!({
                "path": path.to_string_lossy(),
                "rows": table.rows.len(),
            }),
        ),
        Err(e) => err(&req.id, "export_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "table.export" => Some(handle_table_export(state, req)),
        _ => None,
    }
}
