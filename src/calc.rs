use crate::report::{MarksMap, Report, TaskResult};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    Soft,
    Hard,
}

impl DeadlineKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "soft" => Some(DeadlineKind::Soft),
            "hard" => Some(DeadlineKind::Hard),
            _ => None,
        }
    }
}

/// One flattened (student, task) unit of the grading table.
///
/// `points` and `total_points` are owned by the table and move with edits;
/// everything else is copied from the source report at flatten time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub nickname: String,
    pub group_name: String,
    pub student_name: String,
    pub repository: String,
    pub task_id: String,
    pub task_title: String,
    pub build: bool,
    pub docs: bool,
    pub passed_tests: i64,
    pub total_tests: i64,
    pub failed_tests: i64,
    pub ignored_tests: i64,
    pub soft_deadline_pass: bool,
    pub hard_deadline_pass: bool,
    pub points: f64,
    pub total_points: f64,
    pub mark: u8,
}

/// Per-row cell-merge counts for the grouped table. The first row of a
/// group (in table order) carries the group's full row count, later rows
/// carry zero; same for the (group, nickname) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEntry {
    pub group_span: usize,
    pub student_span: usize,
}

/// Versioned snapshot of the grading table. Mutations never touch the
/// receiver; they return a fresh table with `version + 1`, so readers only
/// ever see complete states. Rows are never added, removed or reordered
/// after flatten: row indices key every edit and span computation.
#[derive(Debug, Clone)]
pub struct RowTable {
    pub version: u64,
    marks: MarksMap,
    pub rows: Vec<Row>,
}

fn deadline_flags(tr: &TaskResult) -> (bool, bool) {
    match &tr.deadlines_check_result {
        Some(d) => (d.soft_deadline_pass, d.hard_deadline_pass),
        None => (false, false),
    }
}

/// Point replacement applied when a deadline flag is toggled. Exhaustive
/// over the new (hard, soft) pair; replaces the row's prior points outright.
fn deadline_points(hard: bool, soft: bool) -> f64 {
    match (hard, soft) {
        (true, false) => 0.5,
        (false, true) => 0.0,
        (true, true) => 1.0,
        (false, false) => -0.5,
    }
}

fn retotal_student(rows: &mut [Row], nickname: &str) {
    let total: f64 = rows
        .iter()
        .filter(|r| r.nickname == nickname)
        .map(|r| r.points)
        .sum();
    for r in rows.iter_mut().filter(|r| r.nickname == nickname) {
        r.total_points = total;
    }
}

impl RowTable {
    /// Flattens the report into one row per (student, task result), in
    /// report order. Each student's initial total carries a 0.5 bonus per
    /// met deadline; the initial mark is derived from that aggregate total.
    pub fn flatten(report: &Report) -> RowTable {
        let marks = report.marks_map();
        let mut rows: Vec<Row> = Vec::new();

        for entry in &report.task_runner_results {
            let student_total: f64 = entry
                .tasks_results
                .iter()
                .map(|tr| {
                    let (soft, hard) = deadline_flags(tr);
                    tr.points + if hard { 0.5 } else { 0.0 } + if soft { 0.5 } else { 0.0 }
                })
                .sum();
            let mark = marks.mark_for(student_total);

            for tr in &entry.tasks_results {
                let (soft, hard) = deadline_flags(tr);
                rows.push(Row {
                    nickname: entry.student.nickname.clone(),
                    group_name: entry.student.group_name.clone(),
                    student_name: entry.student.student_name.clone(),
                    repository: entry.student.repository.clone(),
                    task_id: tr.task.id.clone(),
                    task_title: tr.task.title.clone(),
                    build: tr.build,
                    docs: tr.docs,
                    passed_tests: tr.passed_tests,
                    total_tests: tr.total_tests,
                    failed_tests: tr.failed_tests,
                    ignored_tests: tr.ignored_tests,
                    soft_deadline_pass: soft,
                    hard_deadline_pass: hard,
                    points: tr.points,
                    total_points: student_total,
                    mark,
                });
            }
        }

        RowTable {
            version: 0,
            marks,
            rows,
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CalcError> {
        if index >= self.rows.len() {
            return Err(CalcError::new(
                "bad_params",
                format!(
                    "row index {} out of range ({} rows)",
                    index,
                    self.rows.len()
                ),
            ));
        }
        Ok(())
    }

    /// Flips one deadline flag and replaces the row's points from the
    /// toggle table, then re-establishes the student's shared total.
    /// The row's mark is intentionally left at its last-known value; only
    /// `set_points` rederives it.
    pub fn toggle_deadline(&self, index: usize, kind: DeadlineKind) -> Result<RowTable, CalcError> {
        self.check_index(index)?;

        let mut rows = self.rows.clone();
        {
            let row = &mut rows[index];
            match kind {
                DeadlineKind::Soft => row.soft_deadline_pass = !row.soft_deadline_pass,
                DeadlineKind::Hard => row.hard_deadline_pass = !row.hard_deadline_pass,
            }
            row.points = deadline_points(row.hard_deadline_pass, row.soft_deadline_pass);
        }
        let nickname = rows[index].nickname.clone();
        retotal_student(&mut rows, &nickname);

        Ok(RowTable {
            version: self.version + 1,
            marks: self.marks,
            rows,
        })
    }

    /// Overwrites one row's points from raw user input. A blank or
    /// unparseable value is a silent no-op: the unchanged table (same
    /// version) is returned. The row's mark is rederived from the single
    /// row's new points, not from the student aggregate.
    pub fn set_points(&self, index: usize, raw: &str) -> Result<RowTable, CalcError> {
        self.check_index(index)?;

        let Ok(value) = raw.trim().parse::<f64>() else {
            return Ok(self.clone());
        };

        let mut rows = self.rows.clone();
        {
            let row = &mut rows[index];
            row.points = value;
            row.mark = self.marks.mark_for(value);
        }
        let nickname = rows[index].nickname.clone();
        retotal_student(&mut rows, &nickname);

        Ok(RowTable {
            version: self.version + 1,
            marks: self.marks,
            rows,
        })
    }
}

/// Two passes: count rows per group and per (group, nickname), then walk
/// in order handing the full count to the first row of each run.
pub fn compute_spans(rows: &[Row]) -> Vec<SpanEntry> {
    let mut group_counts: HashMap<&str, usize> = HashMap::new();
    let mut student_counts: HashMap<(&str, &str), usize> = HashMap::new();
    for r in rows {
        *group_counts.entry(r.group_name.as_str()).or_insert(0) += 1;
        *student_counts
            .entry((r.group_name.as_str(), r.nickname.as_str()))
            .or_insert(0) += 1;
    }

    let mut seen_groups: HashSet<&str> = HashSet::new();
    let mut seen_students: HashSet<(&str, &str)> = HashSet::new();
    rows.iter()
        .map(|r| {
            let group_span = if seen_groups.insert(r.group_name.as_str()) {
                group_counts[r.group_name.as_str()]
            } else {
                0
            };
            let pair = (r.group_name.as_str(), r.nickname.as_str());
            let student_span = if seen_students.insert(pair) {
                student_counts[&pair]
            } else {
                0
            };
            SpanEntry {
                group_span,
                student_span,
            }
        })
        .collect()
}
