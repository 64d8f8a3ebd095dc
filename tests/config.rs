use std::path::PathBuf;

use notchplate::config;
use notchplate::datatypes::NotchShape;
use notchplate::error::NotchplateError;

fn temp_workdir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("notchplate-{}-{}", tag, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("stale test directory is removable");
    }
    std::fs::create_dir_all(&dir).expect("test directory is creatable");
    dir
}

fn write_input(dir: &PathBuf, contents: &str) -> String {
    let path = dir.join("input.json");
    std::fs::write(&path, contents).expect("input file is writable");
    path.to_string_lossy().to_string()
}

const MINIMAL_INPUT: &str = r#"{
    "metadata": {
        "youngs_modulus": 1325.0,
        "poissons_ratio": 0.45,
        "density": 904e-12
    },
    "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
    "notch": { "angle": { "x1": 15.0, "y1": 15.0 } }
}"#;

#[test]
fn minimal_input_loads_with_defaults() {
    let dir = temp_workdir("config-minimal");
    let input = write_input(&dir, MINIMAL_INPUT);

    let config = config::load(&input).expect("minimal input loads");

    assert!(matches!(config.shape, NotchShape::Angle { .. }));
    assert_eq!(config.material.youngs_modulus, 1325.0);
    assert_eq!(config.loadcase.u2, 2.0);
    assert_eq!(config.mesh.size, 1.0);
    assert_eq!(config.job.num_cpus, 8);
    assert_eq!(config.job.cae_command, "abaqus");
    assert_eq!(config.names.part, "plate");
    assert_eq!(config.names.step, "Step-DImp-plate");
    assert_eq!(config.names.material, "PP");
}

#[test]
fn sections_override_the_defaults() {
    let dir = temp_workdir("config-overrides");
    let input = write_input(
        &dir,
        r#"{
            "metadata": {
                "youngs_modulus": 1325.0,
                "poissons_ratio": 0.45,
                "density": 904e-12,
                "part_name": "specimen"
            },
            "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
            "notch": { "arc_radius": { "r": 31.0 } },
            "loadcase": { "u2": 3.5 },
            "mesh": { "size": 0.5 },
            "job": { "num_cpus": 4, "cae_command": "abq2021" }
        }"#,
    );

    let config = config::load(&input).expect("input with overrides loads");

    assert!(matches!(config.shape, NotchShape::ArcRadius { r } if r == 31.0));
    assert_eq!(config.loadcase.u2, 3.5);
    assert_eq!(config.mesh.size, 0.5);
    assert_eq!(config.mesh.deviation_factor, 0.1); // untouched default
    assert_eq!(config.job.num_cpus, 4);
    assert_eq!(config.job.num_gpus, 1);
    assert_eq!(config.job.cae_command, "abq2021");
    assert_eq!(config.names.job, "Job-DImp-specimen");
}

#[test]
fn empty_notch_section_is_ambiguous() {
    let dir = temp_workdir("config-no-shape");
    let input = write_input(
        &dir,
        r#"{
            "metadata": { "youngs_modulus": 1325.0, "poissons_ratio": 0.45, "density": 904e-12 },
            "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
            "notch": {}
        }"#,
    );

    let err = config::load(&input).expect_err("no shape selected");
    assert!(matches!(err, NotchplateError::AmbiguousShapeSelection(_)));
}

#[test]
fn two_notch_shapes_are_ambiguous() {
    let dir = temp_workdir("config-two-shapes");
    let input = write_input(
        &dir,
        r#"{
            "metadata": { "youngs_modulus": 1325.0, "poissons_ratio": 0.45, "density": 904e-12 },
            "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
            "notch": {
                "angle": { "x1": 15.0, "y1": 15.0 },
                "arc_radius": { "r": 31.0 }
            }
        }"#,
    );

    let err = config::load(&input).expect_err("two shapes selected");
    assert!(matches!(err, NotchplateError::AmbiguousShapeSelection(_)));
}

#[test]
fn missing_material_field_is_reported() {
    let dir = temp_workdir("config-missing-density");
    let input = write_input(
        &dir,
        r#"{
            "metadata": { "youngs_modulus": 1325.0, "poissons_ratio": 0.45 },
            "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
            "notch": { "angle": { "x1": 15.0, "y1": 15.0 } }
        }"#,
    );

    match config::load(&input) {
        Err(NotchplateError::Input(message)) => {
            assert!(message.contains("density"), "message names density: {message}")
        }
        other => panic!("expected Input error, got {other:?}"),
    }
}

#[test]
fn unknown_notch_shape_is_reported() {
    let dir = temp_workdir("config-unknown-shape");
    let input = write_input(
        &dir,
        r#"{
            "metadata": { "youngs_modulus": 1325.0, "poissons_ratio": 0.45, "density": 904e-12 },
            "plate": { "b": 50.0, "h": 50.0, "b0": 15.0, "h0": 17.0, "xa": 30.0, "ye": 30.0 },
            "notch": { "keyhole": { "r": 3.0 } }
        }"#,
    );

    let err = config::load(&input).expect_err("unknown shape name");
    assert!(matches!(err, NotchplateError::Input(_)));
}
