use std::io::Write;
use std::path::Path;

use crate::{
    datatypes::{NotchKind, ResultRow},
    engine::CaeEngine,
    error::NotchplateError,
};

/// Header comment written once when a result file is created.
pub const DATAFILE_HEADER: &str = "# sum of max. princ. s. 75avg (MPa) / surface Area (mm^2)";

pub fn datafile_name(kind: NotchKind) -> String {
    format!("notchtype-{}_data.dat", kind.label())
}

/// Formats a row exactly as stored on disk; this string is also the
/// de-duplication key.
pub fn format_row(row: &ResultRow) -> String {
    format!("{:.6} {:.6}", row.stress_sum, row.surface_area)
}

/// Reduces a completed run's result database to a ResultRow
///
/// The stress reduction is a raw sum over integration points of the final
/// frame; no averaging is applied.
pub fn extract_results(
    engine: &mut dyn CaeEngine,
    step_name: &str,
) -> Result<ResultRow, NotchplateError> {
    let stress_sum = engine.extract_field_sum(step_name)?;
    let surface_area = engine.query_area()?;

    Ok(ResultRow {
        stress_sum,
        surface_area,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Created,
    Appended,
    Duplicate,
}

/// Persists a result row to the per-notch-type data file
///
/// Creates the file with its header line on first use. An exact textual
/// duplicate of an existing row is skipped, so re-running a simulation with
/// identical inputs never grows the file.
///
/// # Arguments
/// * `row` - The result row to persist
/// * `kind` - The notch kind that selects the target file
/// * `work_dir` - The directory holding the result files
///
/// # Returns
/// What happened to the file: created, appended, or duplicate no-op
pub fn append_result(
    row: &ResultRow,
    kind: NotchKind,
    work_dir: &Path,
) -> Result<AppendOutcome, NotchplateError> {
    let path = work_dir.join(datafile_name(kind));
    let line = format_row(row);

    if !path.is_file() {
        let contents = format!("{DATAFILE_HEADER}\n{line}\n");
        if let Err(err) = std::fs::write(&path, contents) {
            return Err(NotchplateError::PostProcessor(format!(
                "Failed to create {}: {err}",
                path.display()
            )));
        }
        println!("info: created {} with first result row", path.display());
        return Ok(AppendOutcome::Created);
    }

    let existing = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(err) => {
            return Err(NotchplateError::PostProcessor(format!(
                "Failed to read {}: {err}",
                path.display()
            )))
        }
    };

    if existing.lines().any(|recorded| recorded == line) {
        println!(
            "info: result row already recorded in {}; nothing to do",
            path.display()
        );
        return Ok(AppendOutcome::Duplicate);
    }

    let mut file = match std::fs::OpenOptions::new().append(true).open(&path) {
        Ok(f) => f,
        Err(err) => {
            return Err(NotchplateError::PostProcessor(format!(
                "Failed to open {} for append: {err}",
                path.display()
            )))
        }
    };

    if let Err(err) = writeln!(file, "{line}") {
        return Err(NotchplateError::PostProcessor(format!(
            "Failed to append to {}: {err}",
            path.display()
        )));
    }

    println!("info: appended result row to {}", path.display());
    Ok(AppendOutcome::Appended)
}
