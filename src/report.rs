use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Commit-activity statistics gathered by the checker for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsCheckResult {
    pub total_commits: i64,
    pub total_active_weeks: i64,
    pub maximum_commits_per_week: i64,
    pub total_weeks: i64,
    #[serde(default)]
    pub commits_per_week_list: Vec<WeekCommits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCommits {
    pub week: String,
    pub commits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_name: String,
    pub repository: String,
    pub nickname: String,
    pub group_name: String,
    pub commits_check_result: CommitsCheckResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub points: i64,
    pub soft_deadline: NaiveDate,
    pub hard_deadline: NaiveDate,
}

/// Absent in the report when the checker never ran the deadline check
/// for a task; both flags are then treated as false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlinesCheckResult {
    #[serde(default)]
    pub soft_deadline_pass: bool,
    #[serde(default)]
    pub hard_deadline_pass: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub build: bool,
    pub docs: bool,
    pub passed_tests: i64,
    pub total_tests: i64,
    pub failed_tests: i64,
    pub ignored_tests: i64,
    #[serde(default)]
    pub deadlines_check_result: Option<DeadlinesCheckResult>,
    pub task: Task,
    pub points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResultEntry {
    pub student: Student,
    pub tasks_results: Vec<TaskResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
}

/// Ascending thresholds mapping point totals to a 5-point mark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksMap {
    pub satisfactory: f64,
    pub good: f64,
    pub excellent: f64,
}

impl MarksMap {
    /// Thresholds are inclusive lower bounds; anything below
    /// `satisfactory` falls through to the floor mark 2.
    pub fn mark_for(&self, points: f64) -> u8 {
        if points >= self.excellent {
            5
        } else if points >= self.good {
            4
        } else if points >= self.satisfactory {
            3
        } else {
            2
        }
    }

    fn is_monotonic(&self) -> bool {
        self.satisfactory <= self.good && self.good <= self.excellent
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalSettings {
    pub marks_map: MarksMap,
}

/// The immutable source-of-truth document produced by the checker run.
/// Loaded once per session and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub task_runner_results: Vec<StudentResultEntry>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub students: Vec<Student>,
    pub additional_settings: AdditionalSettings,

    // Lookup indexes built once at load; positions into the vectors above.
    #[serde(skip)]
    task_index: HashMap<String, usize>,
    #[serde(skip)]
    student_index: HashMap<String, usize>,
    #[serde(skip)]
    group_index: HashMap<String, usize>,
}

impl Report {
    pub fn marks_map(&self) -> MarksMap {
        self.additional_settings.marks_map
    }

    fn build_indexes(&mut self) {
        self.task_index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.student_index = self
            .students
            .iter()
            .enumerate()
            .map(|(i, s)| (s.nickname.clone(), i))
            .collect();
        self.group_index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.clone(), i))
            .collect();
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.task_index.get(id).map(|&i| &self.tasks[i])
    }

    pub fn student_by_nickname(&self, nickname: &str) -> Option<&Student> {
        self.student_index.get(nickname).map(|&i| &self.students[i])
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.group_index.get(name).map(|&i| &self.groups[i])
    }
}

pub fn load_report(path: &Path) -> anyhow::Result<Report> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report file {}", path.to_string_lossy()))?;
    let mut report: Report = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse report file {}", path.to_string_lossy()))?;
    report.build_indexes();

    let marks = report.marks_map();
    if !marks.is_monotonic() {
        anyhow::bail!(
            "marks map thresholds must be ascending: satisfactory={} good={} excellent={}",
            marks.satisfactory,
            marks.good,
            marks.excellent
        );
    }

    Ok(report)
}
