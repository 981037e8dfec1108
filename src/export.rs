use crate::calc::{Row, RowTable};
use anyhow::Context;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Fixed output name; the shell decides the directory.
pub const EXPORT_FILE_NAME: &str = "report.xlsx";

const HEADERS: [&str; 14] = [
    "Student name",
    "Repository",
    "Group",
    "Soft deadline",
    "Hard deadline",
    "Build",
    "Documentation",
    "Total tests",
    "Passed tests",
    "Failed tests",
    "Task",
    "Task points",
    "Total points",
    "Mark",
];

fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}

fn write_row(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    r: u32,
    row: &Row,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    worksheet.write_string(r, 0, &row.student_name)?;
    worksheet.write_string(r, 1, &row.repository)?;
    worksheet.write_string(r, 2, &row.group_name)?;
    worksheet.write_string(r, 3, yes_no(row.soft_deadline_pass))?;
    worksheet.write_string(r, 4, yes_no(row.hard_deadline_pass))?;
    worksheet.write_string(r, 5, yes_no(row.build))?;
    worksheet.write_string(r, 6, yes_no(row.docs))?;
    worksheet.write_number(r, 7, row.total_tests as f64)?;
    worksheet.write_number(r, 8, row.passed_tests as f64)?;
    worksheet.write_number(r, 9, row.failed_tests as f64)?;
    worksheet.write_string(r, 10, &row.task_title)?;
    worksheet.write_number(r, 11, row.points)?;
    worksheet.write_number(r, 12, row.total_points)?;
    worksheet.write_number(r, 13, row.mark as f64)?;
    Ok(())
}

/// Projects the current table into `report.xlsx` under `dir`: a header row
/// of fixed labels, then one record per row in table order. Booleans render
/// as Yes/No labels, never raw. Reads the snapshot only; never mutates it.
pub fn export_rows(table: &RowTable, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.to_string_lossy()))?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (c, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, c as u16, *header)
            .context("failed to write export header")?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        write_row(worksheet, (i + 1) as u32, row)
            .with_context(|| format!("failed to write export row {}", i))?;
    }

    let path = dir.join(EXPORT_FILE_NAME);
    workbook
        .save(&path)
        .with_context(|| format!("failed to save export file {}", path.to_string_lossy()))?;
    Ok(path)
}
