#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// Result-file key; both arc variants share one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotchKind {
    Spline,
    Arc,
    Angle,
}

impl NotchKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotchKind::Spline => "spline",
            NotchKind::Arc => "arc",
            NotchKind::Angle => "angle",
        }
    }
}

/// Shape of the cut in the plate corner, with its control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotchShape {
    Spline { c1: Vertex, c2: Vertex },
    ArcRadius { r: f64 },
    ArcThreePoint { mid: Vertex },
    Angle { corner: Vertex },
}

impl NotchShape {
    pub fn kind(&self) -> NotchKind {
        match self {
            NotchShape::Spline { .. } => NotchKind::Spline,
            NotchShape::ArcRadius { .. } | NotchShape::ArcThreePoint { .. } => NotchKind::Arc,
            NotchShape::Angle { .. } => NotchKind::Angle,
        }
    }
}

/// Raw plate dimensions as read from the input file. Units are t / mm / s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateGeometry {
    pub b: f64,
    pub h: f64,
    pub b0: f64,
    pub h0: f64,
    pub xa: f64,
    pub ye: f64,
}

/// Plate dimensions plus notch shape that passed validation.
///
/// Only `sketch::validate` produces these. For the radius arc variant,
/// `xa` and `ye` have been overwritten with the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchParameters {
    pub b: f64,
    pub h: f64,
    pub b0: f64,
    pub h0: f64,
    pub xa: f64,
    pub ye: f64,
    pub shape: NotchShape,
}

/// A 2D path element of the plate outline.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchPrimitive {
    Line {
        p1: Vertex,
        p2: Vertex,
    },
    ArcCenterEnds {
        center: Vertex,
        start: Vertex,
        end: Vertex,
        clockwise: bool,
    },
    ArcThreePoints {
        start: Vertex,
        end: Vertex,
        mid: Vertex,
    },
    Spline {
        points: Vec<Vertex>,
    },
}

/// One completed simulation run, as persisted to the result files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow {
    pub stress_sum: f64,
    pub surface_area: f64,
}

#[derive(Debug, Clone)]
pub struct MaterialConfig {
    pub youngs_modulus: f64,
    pub poissons_ratio: f64,
    pub density: f64,
}

#[derive(Debug, Clone)]
pub struct MeshConfig {
    pub size: f64,
    pub deviation_factor: f64,
    pub min_size_factor: f64,
}

impl Default for MeshConfig {
    fn default() -> MeshConfig {
        MeshConfig {
            size: 1.0,
            deviation_factor: 0.1,
            min_size_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepConfig {
    pub time_interval: f64,
    pub initial_increment: f64,
    pub min_increment: f64,
    pub max_num_increments: usize,
}

impl Default for StepConfig {
    fn default() -> StepConfig {
        StepConfig {
            time_interval: 0.1,
            initial_increment: 1e-6,
            min_increment: 1e-12,
            max_num_increments: 100_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadcaseConfig {
    /// Prescribed displacement of the driving edge in the y-direction.
    pub u2: f64,
}

impl Default for LoadcaseConfig {
    fn default() -> LoadcaseConfig {
        LoadcaseConfig { u2: 2.0 }
    }
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub num_cpus: usize,
    pub num_gpus: usize,
    /// Executable that launches the CAE host, e.g. `abaqus`.
    pub cae_command: String,
}

impl Default for JobConfig {
    fn default() -> JobConfig {
        JobConfig {
            num_cpus: 8,
            num_gpus: 1,
            cae_command: "abaqus".to_string(),
        }
    }
}

/// Names of the host-side objects, all derived from the part name.
#[derive(Debug, Clone)]
pub struct ModelNames {
    pub model: String,
    pub sketch: String,
    pub part: String,
    pub material: String,
    pub instance: String,
    pub step: String,
    pub job: String,
}

impl ModelNames {
    pub fn derive(part_name: &str, material_name: &str) -> ModelNames {
        ModelNames {
            model: format!("{}-model", part_name),
            sketch: format!("{}-sketch", part_name),
            part: part_name.to_string(),
            material: material_name.to_string(),
            instance: format!("instance-{}", part_name),
            step: format!("Step-DImp-{}", part_name),
            job: format!("Job-DImp-{}", part_name),
        }
    }
}

/// Everything one simulation run needs, loaded from the input file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub material: MaterialConfig,
    pub plate: PlateGeometry,
    pub shape: NotchShape,
    pub loadcase: LoadcaseConfig,
    pub mesh: MeshConfig,
    pub step: StepConfig,
    pub job: JobConfig,
    pub names: ModelNames,
}
