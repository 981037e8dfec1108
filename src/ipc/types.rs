use crate::calc::RowTable;
use crate::report::Report;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Session state: the immutable source report and the current grading
/// table snapshot. Edits replace `table` wholesale.
pub struct AppState {
    pub report: Option<Report>,
    pub table: Option<RowTable>,
}
