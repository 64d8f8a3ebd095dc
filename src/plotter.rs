use std::path::{Path, PathBuf};

use crate::{datatypes::ResultRow, error::NotchplateError};

/// Result files carry one descriptive header line by convention.
pub const DEFAULT_HEADER_LENGTH: usize = 1;

/// A row that failed to parse; `row` is 1-based within the data region.
struct ParseFailure {
    row: usize,
    message: String,
}

fn parse_rows(contents: &str, skip: usize) -> Result<Vec<ResultRow>, ParseFailure> {
    let mut rows: Vec<ResultRow> = Vec::new();

    for (index, line) in contents.lines().skip(skip).enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(ParseFailure {
                row: index + 1,
                message: format!("expected 2 columns, found {}", fields.len()),
            });
        }

        let stress_sum: f64 = match fields[0].parse() {
            Ok(v) => v,
            Err(_) => {
                return Err(ParseFailure {
                    row: index + 1,
                    message: format!("non-numeric value '{}'", fields[0]),
                })
            }
        };
        let surface_area: f64 = match fields[1].parse() {
            Ok(v) => v,
            Err(_) => {
                return Err(ParseFailure {
                    row: index + 1,
                    message: format!("non-numeric value '{}'", fields[1]),
                })
            }
        };

        rows.push(ResultRow {
            stress_sum,
            surface_area,
        });
    }

    Ok(rows)
}

/// Loads rows from a result file, auto-detecting extra header lines
///
/// The first parse skips `header_length` lines. If it fails, the failing data
/// row index is folded into the skip count and the parse is retried once; a
/// second failure is fatal.
///
/// # Arguments
/// * `path` - The result file to load
/// * `header_length` - Number of header lines expected at the top of the file
///
/// # Returns
/// The parsed rows in file order
pub fn load_datafile(
    path: &Path,
    header_length: usize,
) -> Result<Vec<ResultRow>, NotchplateError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_err) => {
            return Err(NotchplateError::Input(format!(
                "Unable to open result file {}",
                path.display()
            )))
        }
    };

    match parse_rows(&contents, header_length) {
        Ok(rows) => Ok(rows),
        Err(failure) => {
            let retry_skip = header_length + failure.row;
            println!(
                "warning [plot]: {} at data row {} of {}; retrying with {} leading lines skipped",
                failure.message,
                failure.row,
                path.display(),
                retry_skip
            );

            match parse_rows(&contents, retry_skip) {
                Ok(rows) => {
                    println!(
                        "info: continued reading {} at line {}",
                        path.display(),
                        retry_skip
                    );
                    Ok(rows)
                }
                Err(second) => Err(NotchplateError::ParseRecoveryFailure(format!(
                    "{}: {} at data row {} after skipping {} lines",
                    path.display(),
                    second.message,
                    second.row,
                    retry_skip
                ))),
            }
        }
    }
}

/// Orders rows by surface area ascending, the x-axis of every chart.
pub fn sort_by_area(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| a.surface_area.total_cmp(&b.surface_area));
}

/// Finds all per-notch-type result files in a directory
pub fn discover_datafiles(work_dir: &Path) -> Result<Vec<PathBuf>, NotchplateError> {
    let entries = match std::fs::read_dir(work_dir) {
        Ok(e) => e,
        Err(err) => {
            return Err(NotchplateError::Input(format!(
                "Unable to read directory {}: {err}",
                work_dir.display()
            )))
        }
    };

    let mut datafiles: Vec<PathBuf> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("notchtype-") && name.ends_with("_data.dat") {
            datafiles.push(entry.path());
        }
    }
    datafiles.sort();

    Ok(datafiles)
}

fn resolve_plot_script() -> Result<PathBuf, NotchplateError> {
    let local = Path::new("scripts/plot.py");
    if local.is_file() {
        return Ok(local.to_path_buf());
    }

    // running from an installed binary; look for the script near the executable
    if let Ok(exe) = std::env::current_exe() {
        for ancestor in exe.ancestors() {
            let candidate = ancestor.join("scripts/plot.py");
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(NotchplateError::PostProcessor(
        "Unable to find plotter script scripts/plot.py".to_string(),
    ))
}

fn render(plots_dir: &Path, series_files: &[PathBuf]) -> Result<(), NotchplateError> {
    let script = resolve_plot_script()?;

    println!("info: plotting in python...");
    let mut command = std::process::Command::new("python");
    command.arg(&script).arg(plots_dir);
    for series in series_files {
        command.arg(series);
    }

    let output = match command.output() {
        Ok(out) => out,
        Err(err) => {
            return Err(NotchplateError::PostProcessor(format!(
                "Failed to launch python plotter: {err}"
            )))
        }
    };

    if !output.status.success() {
        return Err(NotchplateError::PostProcessor(format!(
            "Plotter exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    println!("info: wrote plots to {}", plots_dir.display());
    Ok(())
}

/// Renders one chart per result file plus a combined overlay chart
///
/// Result files are read-only inputs here; sorting happens on the in-memory
/// copy handed to the renderer.
///
/// # Arguments
/// * `work_dir` - The directory holding the result files
pub fn run(work_dir: &Path) -> Result<(), NotchplateError> {
    let datafiles = discover_datafiles(work_dir)?;

    if datafiles.is_empty() {
        println!(
            "warning [plot]: no result files found in {}",
            work_dir.display()
        );
        return Ok(());
    }
    println!("info: found {} result files", datafiles.len());

    let plots_dir = work_dir.join("plots");
    if !plots_dir.is_dir() {
        if let Err(err) = std::fs::create_dir_all(&plots_dir) {
            return Err(NotchplateError::PostProcessor(format!(
                "Failed to create {}: {err}",
                plots_dir.display()
            )));
        }
    }

    // write one sorted series per result file for the renderer
    let mut series_files: Vec<PathBuf> = Vec::new();
    let mut outcome = Ok(());

    for datafile in &datafiles {
        let mut rows = match load_datafile(datafile, DEFAULT_HEADER_LENGTH) {
            Ok(rows) => rows,
            Err(err) => {
                outcome = Err(err);
                break;
            }
        };
        sort_by_area(&mut rows);

        let base = datafile
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "series".to_string());
        let series_path = work_dir.join(format!("{base}.series.csv"));

        let mut contents = String::from("stress_sum,surface_area\n");
        for row in &rows {
            contents.push_str(&format!("{:.6},{:.6}\n", row.stress_sum, row.surface_area));
        }

        if let Err(err) = std::fs::write(&series_path, contents) {
            outcome = Err(NotchplateError::PostProcessor(format!(
                "Failed to write {}: {err}",
                series_path.display()
            )));
            break;
        }
        series_files.push(series_path);
    }

    if outcome.is_ok() {
        outcome = render(&plots_dir, &series_files);
    }

    // the series files are scratch space for the renderer, not outputs
    for series in &series_files {
        let _ = std::fs::remove_file(series);
    }

    outcome
}
