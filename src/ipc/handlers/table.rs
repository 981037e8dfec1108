use crate::calc::{compute_spans, DeadlineKind, RowTable};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn require_table<'a>(state: &'a AppState, req: &Request) -> Result<&'a RowTable, serde_json::Value> {
    state
        .table
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_report", "open a report first", None))
}

fn parse_index(req: &Request) -> Result<usize, serde_json::Value> {
    match req.params.get("index").and_then(|v| v.as_u64()) {
        Some(v) => Ok(v as usize),
        None => Err(err(&req.id, "bad_params", "missing/invalid index", None)),
    }
}

fn handle_table_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match require_table(state, req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "version": table.version,
            "rows": table.rows,
        }),
    )
}

fn handle_table_spans(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match require_table(state, req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "version": table.version,
            "spans": compute_spans(&table.rows),
        }),
    )
}

fn handle_toggle_deadline(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match parse_index(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let kind = match req
        .params
        .get("kind")
        .and_then(|v| v.as_str())
        .and_then(DeadlineKind::parse)
    {
        Some(k) => k,
        None => {
            return err(
                &req.id,
                "bad_params",
                "kind must be one of: soft, hard",
                None,
            )
        }
    };
    let table = match require_table(state, req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match table.toggle_deadline(index, kind) {
        Ok(next) => {
            let result = json!({
                "version": next.version,
                "row": next.rows[index],
                "totalPoints": next.rows[index].total_points,
            });
            state.table = Some(next);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, &e.code, e.message, Some(json!({ "index": index }))),
    }
}

fn handle_set_points(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match parse_index(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // The raw text of the edit box; a JSON number is accepted and
    // stringified. Anything unparseable downstream is a silent no-op.
    let raw = match req.params.get("value") {
        Some(v) if v.is_string() => v.as_str().unwrap_or_default().to_string(),
        Some(v) if v.is_number() => v.to_string(),
        _ => String::new(),
    };
    let table = match require_table(state, req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match table.set_points(index, &raw) {
        Ok(next) => {
            let changed = next.version != table.version;
            let result = json!({
                "version": next.version,
                "changed": changed,
                "row": next.rows[index],
            });
            state.table = Some(next);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, &e.code, e.message, Some(json!({ "index": index }))),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "table.get" => Some(handle_table_get(state, req)),
        "table.spans" => Some(handle_table_spans(state, req)),
        "table.toggleDeadline" => Some(handle_toggle_deadline(state, req)),
        "table.setPoints" => Some(handle_set_points(state, req)),
        _ => None,
    }
}
