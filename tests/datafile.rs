use std::path::PathBuf;

use notchplate::datatypes::{NotchKind, ResultRow};
use notchplate::error::NotchplateError;
use notchplate::plotter::{discover_datafiles, load_datafile, sort_by_area};
use notchplate::post_processor::{
    append_result, datafile_name, format_row, AppendOutcome, DATAFILE_HEADER,
};

fn temp_workdir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("notchplate-{}-{}", tag, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("stale test directory is removable");
    }
    std::fs::create_dir_all(&dir).expect("test directory is creatable");
    dir
}

fn row(stress_sum: f64, surface_area: f64) -> ResultRow {
    ResultRow {
        stress_sum,
        surface_area,
    }
}

#[test]
fn append_is_idempotent() {
    let dir = temp_workdir("append-idempotent");
    let result = row(123.456789, 45.0);

    assert_eq!(
        append_result(&result, NotchKind::Angle, &dir).expect("first append"),
        AppendOutcome::Created
    );
    assert_eq!(
        append_result(&result, NotchKind::Angle, &dir).expect("second append"),
        AppendOutcome::Duplicate
    );

    let contents = std::fs::read_to_string(dir.join("notchtype-angle_data.dat"))
        .expect("result file exists");
    assert_eq!(contents, format!("{DATAFILE_HEADER}\n123.456789 45.000000\n"));
}

#[test]
fn rows_with_distinct_rounded_strings_are_both_kept() {
    let dir = temp_workdir("append-seventh-decimal");

    // 1.1234561 formats to 1.123456, 1.1234569 to 1.123457
    assert_eq!(
        append_result(&row(1.1234561, 2.0), NotchKind::Arc, &dir).expect("first append"),
        AppendOutcome::Created
    );
    assert_eq!(
        append_result(&row(1.1234569, 2.0), NotchKind::Arc, &dir).expect("second append"),
        AppendOutcome::Appended
    );

    let contents =
        std::fs::read_to_string(dir.join(datafile_name(NotchKind::Arc))).expect("file exists");
    assert_eq!(contents.lines().count(), 3); // header plus two rows
}

#[test]
fn rows_rounding_to_the_same_string_are_deduplicated() {
    let dir = temp_workdir("append-rounded-duplicate");

    // both format to 1.123456
    assert_eq!(
        append_result(&row(1.1234561, 2.0), NotchKind::Spline, &dir).expect("first append"),
        AppendOutcome::Created
    );
    assert_eq!(
        append_result(&row(1.1234560, 2.0), NotchKind::Spline, &dir).expect("second append"),
        AppendOutcome::Duplicate
    );

    let contents =
        std::fs::read_to_string(dir.join(datafile_name(NotchKind::Spline))).expect("file exists");
    assert_eq!(contents.lines().count(), 2); // header plus one row
}

#[test]
fn loader_round_trips_appended_rows() {
    let dir = temp_workdir("loader-round-trip");
    let written = [row(5.0, 30.0), row(2.0, 10.0), row(8.0, 20.0)];

    for result in &written {
        append_result(result, NotchKind::Angle, &dir).expect("append succeeds");
    }

    let loaded = load_datafile(&dir.join(datafile_name(NotchKind::Angle)), 1)
        .expect("round trip parse succeeds");

    assert_eq!(loaded.len(), written.len());
    let mut written_strings: Vec<String> = written.iter().map(format_row).collect();
    let mut loaded_strings: Vec<String> = loaded.iter().map(format_row).collect();
    written_strings.sort();
    loaded_strings.sort();
    assert_eq!(written_strings, loaded_strings);
}

#[test]
fn sort_orders_rows_by_area_ascending() {
    let mut rows = vec![row(5.0, 30.0), row(2.0, 10.0), row(8.0, 20.0)];

    sort_by_area(&mut rows);

    let areas: Vec<f64> = rows.iter().map(|r| r.surface_area).collect();
    assert_eq!(areas, vec![10.0, 20.0, 30.0]);
    let stresses: Vec<f64> = rows.iter().map(|r| r.stress_sum).collect();
    assert_eq!(stresses, vec![2.0, 8.0, 5.0]);
}

#[test]
fn one_extra_header_line_is_recovered() {
    let dir = temp_workdir("loader-extra-header");
    let path = dir.join("notchtype-angle_data.dat");
    std::fs::write(&path, "# first header\n# second header\n1.000000 2.000000\n")
        .expect("test file is writable");

    let rows = load_datafile(&path, 1).expect("one retry covers the extra header");

    assert_eq!(rows, vec![row(1.0, 2.0)]);
}

#[test]
fn two_extra_header_lines_defeat_the_single_retry() {
    let dir = temp_workdir("loader-fatal-header");
    let path = dir.join("notchtype-angle_data.dat");
    std::fs::write(
        &path,
        "# first header\n# second header\n# third header\n1.000000 2.000000\n",
    )
    .expect("test file is writable");

    let err = load_datafile(&path, 1).expect_err("second failure is fatal");
    assert!(matches!(err, NotchplateError::ParseRecoveryFailure(_)));
}

#[test]
fn discovery_matches_only_result_files() {
    let dir = temp_workdir("discovery");
    for name in [
        "notchtype-angle_data.dat",
        "notchtype-arc_data.dat",
        "notes.txt",
        "notchtype-angle_data.series.csv",
    ] {
        std::fs::write(dir.join(name), "").expect("test file is writable");
    }

    let found = discover_datafiles(&dir).expect("directory is readable");

    let names: Vec<String> = found
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    assert_eq!(
        names,
        vec!["notchtype-angle_data.dat", "notchtype-arc_data.dat"]
    );
}
