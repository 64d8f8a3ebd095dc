use json::JsonValue;

use crate::{
    datatypes::{
        JobConfig, LoadcaseConfig, MaterialConfig, MeshConfig, ModelNames, NotchShape,
        PlateGeometry, RunConfig, StepConfig, Vertex,
    },
    error::NotchplateError,
};

/// Parses the input json into a JsonValue object
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A JsonValue object
fn load_input_file(input_file: &str) -> Result<JsonValue, NotchplateError> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(NotchplateError::Input(format!(
                "Unable to open input file {}",
                input_file
            )))
        }
    };

    let input_file_json = match json::parse(&file_string) {
        Ok(f) => f,
        Err(err) => {
            return Err(NotchplateError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_file_json.has_key("metadata") {
        return Err(NotchplateError::Input(
            "Input json missing metadata section".to_string(),
        ));
    }
    if !input_file_json.has_key("plate") {
        return Err(NotchplateError::Input(
            "Input json missing plate section".to_string(),
        ));
    }
    if !input_file_json.has_key("notch") {
        return Err(NotchplateError::Input(
            "Input json missing notch section".to_string(),
        ));
    }

    Ok(input_file_json)
}

/// Reads a required float field from a json section
fn require_f64(section: &JsonValue, section_name: &str, field: &str) -> Result<f64, NotchplateError> {
    match section[field].as_f64() {
        Some(v) => Ok(v),
        None => Err(NotchplateError::Input(format!(
            "Input json missing {field} field in {section_name} section"
        ))),
    }
}

/// Reads an optional float field, erroring only when present but non-numeric
fn optional_f64(
    section: &JsonValue,
    section_name: &str,
    field: &str,
) -> Result<Option<f64>, NotchplateError> {
    if !section.has_key(field) {
        return Ok(None);
    }
    match section[field].as_f64() {
        Some(v) => Ok(Some(v)),
        None => Err(NotchplateError::Input(format!(
            "Bad value for {field} in {section_name} section"
        ))),
    }
}

fn parse_material(input_json: &JsonValue) -> Result<MaterialConfig, NotchplateError> {
    let metadata = &input_json["metadata"];

    Ok(MaterialConfig {
        youngs_modulus: require_f64(metadata, "metadata", "youngs_modulus")?,
        poissons_ratio: require_f64(metadata, "metadata", "poissons_ratio")?,
        density: require_f64(metadata, "metadata", "density")?,
    })
}

fn parse_plate(input_json: &JsonValue) -> Result<PlateGeometry, NotchplateError> {
    let plate = &input_json["plate"];

    Ok(PlateGeometry {
        b: require_f64(plate, "plate", "b")?,
        h: require_f64(plate, "plate", "h")?,
        b0: require_f64(plate, "plate", "b0")?,
        h0: require_f64(plate, "plate", "h0")?,
        xa: require_f64(plate, "plate", "xa")?,
        ye: require_f64(plate, "plate", "ye")?,
    })
}

/// Parses the notch section into a shape variant
///
/// Exactly one shape entry must be present; zero or multiple entries is a
/// configuration error, not a silent fall-through.
fn parse_notch(input_json: &JsonValue) -> Result<NotchShape, NotchplateError> {
    let notch = &input_json["notch"];
    let mut selected: Vec<NotchShape> = Vec::new();

    for (name, shape_json) in notch.entries() {
        let shape = match name {
            "spline" => NotchShape::Spline {
                c1: Vertex {
                    x: require_f64(shape_json, "notch.spline", "x1")?,
                    y: require_f64(shape_json, "notch.spline", "y1")?,
                },
                c2: Vertex {
                    x: require_f64(shape_json, "notch.spline", "x2")?,
                    y: require_f64(shape_json, "notch.spline", "y2")?,
                },
            },
            "arc_radius" => NotchShape::ArcRadius {
                r: require_f64(shape_json, "notch.arc_radius", "r")?,
            },
            "arc_3point" => NotchShape::ArcThreePoint {
                mid: Vertex {
                    x: require_f64(shape_json, "notch.arc_3point", "x1")?,
                    y: require_f64(shape_json, "notch.arc_3point", "y1")?,
                },
            },
            "angle" => NotchShape::Angle {
                corner: Vertex {
                    x: require_f64(shape_json, "notch.angle", "x1")?,
                    y: require_f64(shape_json, "notch.angle", "y1")?,
                },
            },
            other => {
                return Err(NotchplateError::Input(format!(
                    "Unrecognized notch shape '{other}'. Supported shapes are \
                     spline, arc_radius, arc_3point, and angle"
                )))
            }
        };
        selected.push(shape);
    }

    match selected.len() {
        0 => Err(NotchplateError::AmbiguousShapeSelection(
            "No notch shape selected in notch section".to_string(),
        )),
        1 => Ok(selected.remove(0)),
        n => Err(NotchplateError::AmbiguousShapeSelection(format!(
            "{n} notch shapes selected in notch section; exactly one is required"
        ))),
    }
}

fn parse_loadcase(input_json: &JsonValue) -> Result<LoadcaseConfig, NotchplateError> {
    let mut loadcase = LoadcaseConfig::default();

    if let Some(u2) = optional_f64(&input_json["loadcase"], "loadcase", "u2")? {
        loadcase.u2 = u2;
    }

    Ok(loadcase)
}

fn parse_mesh(input_json: &JsonValue) -> Result<MeshConfig, NotchplateError> {
    let section = &input_json["mesh"];
    let mut mesh = MeshConfig::default();

    if let Some(size) = optional_f64(section, "mesh", "size")? {
        mesh.size = size;
    }
    if let Some(deviation_factor) = optional_f64(section, "mesh", "deviation_factor")? {
        mesh.deviation_factor = deviation_factor;
    }
    if let Some(min_size_factor) = optional_f64(section, "mesh", "min_size_factor")? {
        mesh.min_size_factor = min_size_factor;
    }

    Ok(mesh)
}

fn parse_step(input_json: &JsonValue) -> Result<StepConfig, NotchplateError> {
    let section = &input_json["step"];
    let mut step = StepConfig::default();

    if let Some(time_interval) = optional_f64(section, "step", "time_interval")? {
        step.time_interval = time_interval;
    }
    if let Some(initial_increment) = optional_f64(section, "step", "initial_increment")? {
        step.initial_increment = initial_increment;
    }
    if let Some(min_increment) = optional_f64(section, "step", "min_increment")? {
        step.min_increment = min_increment;
    }
    if section.has_key("max_num_increments") {
        step.max_num_increments = match section["max_num_increments"].as_usize() {
            Some(n) => n,
            None => {
                return Err(NotchplateError::Input(
                    "Bad value for max_num_increments in step section".to_string(),
                ))
            }
        };
    }

    Ok(step)
}

fn parse_job(input_json: &JsonValue) -> Result<JobConfig, NotchplateError> {
    let section = &input_json["job"];
    let mut job = JobConfig::default();

    if section.has_key("num_cpus") {
        job.num_cpus = match section["num_cpus"].as_usize() {
            Some(n) => n,
            None => {
                return Err(NotchplateError::Input(
                    "Bad value for num_cpus in job section".to_string(),
                ))
            }
        };
    }
    if section.has_key("num_gpus") {
        job.num_gpus = match section["num_gpus"].as_usize() {
            Some(n) => n,
            None => {
                return Err(NotchplateError::Input(
                    "Bad value for num_gpus in job section".to_string(),
                ))
            }
        };
    }
    if section.has_key("cae_command") {
        job.cae_command = match section["cae_command"].as_str() {
            Some(c) => c.to_string(),
            None => {
                return Err(NotchplateError::Input(
                    "Bad value for cae_command in job section".to_string(),
                ))
            }
        };
    }

    Ok(job)
}

/// Loads a full run configuration from an input json file
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A RunConfig instance with defaults applied to the optional sections
pub fn load(input_file: &str) -> Result<RunConfig, NotchplateError> {
    let input_json = load_input_file(input_file)?;

    let part_name = input_json["metadata"]["part_name"].as_str().unwrap_or("plate");
    let material_name = input_json["metadata"]["material_name"].as_str().unwrap_or("PP");

    let config = RunConfig {
        material: parse_material(&input_json)?,
        plate: parse_plate(&input_json)?,
        shape: parse_notch(&input_json)?,
        loadcase: parse_loadcase(&input_json)?,
        mesh: parse_mesh(&input_json)?,
        step: parse_step(&input_json)?,
        job: parse_job(&input_json)?,
        names: ModelNames::derive(part_name, material_name),
    };

    println!(
        "info: loaded run configuration for part '{}' with {} notch",
        config.names.part,
        config.shape.kind().label()
    );

    Ok(config)
}
