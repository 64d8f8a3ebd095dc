use std::path::PathBuf;

use json::JsonValue;

use crate::{
    datatypes::{NotchParameters, RunConfig, SketchPrimitive, Vertex},
    error::NotchplateError,
};

const REPORT_FILE: &str = "notchplate-report.json";

/// Capability surface of the external CAE host.
///
/// The pipeline only ever talks to the host through these four calls, so
/// everything upstream of the host can be exercised against a substitute
/// implementation.
pub trait CaeEngine {
    /// Builds the model, part, material, step, boundary conditions, mesh, and
    /// job on the host from the given sketch.
    fn build_geometry(
        &mut self,
        config: &RunConfig,
        params: &NotchParameters,
        sketch: &[SketchPrimitive],
    ) -> Result<(), NotchplateError>;

    /// Submits the prepared job and blocks until it reaches a terminal state.
    fn submit_and_wait(&mut self) -> Result<(), NotchplateError>;

    /// Sums the max-principal-stress value at every integration point of the
    /// final frame of the named step.
    fn extract_field_sum(&mut self, step_name: &str) -> Result<f64, NotchplateError>;

    /// Returns the total face area of the part.
    fn query_area(&mut self) -> Result<f64, NotchplateError>;
}

/// Drives the proprietary CAE host by rendering a journal script and running
/// the host binary in batch mode. The journal dumps the raw stress field and
/// the face area to a json report that the extraction calls read back.
pub struct HostCae {
    work_dir: PathBuf,
    cae_command: Option<String>,
    journal_path: Option<PathBuf>,
}

impl HostCae {
    pub fn new(work_dir: PathBuf) -> HostCae {
        HostCae {
            work_dir,
            cae_command: None,
            journal_path: None,
        }
    }

    fn read_report(&self) -> Result<JsonValue, NotchplateError> {
        let report_path = self.work_dir.join(REPORT_FILE);

        let contents = match std::fs::read_to_string(&report_path) {
            Ok(c) => c,
            Err(err) => {
                return Err(NotchplateError::EngineFailure(format!(
                    "Unable to open result report {}: {err}",
                    report_path.display()
                )))
            }
        };

        match json::parse(&contents) {
            Ok(report) => Ok(report),
            Err(err) => Err(NotchplateError::EngineFailure(format!(
                "Malformed result report: {err}"
            ))),
        }
    }
}

fn point(v: Vertex) -> String {
    format!("({}, {})", v.x, v.y)
}

fn sketch_statement(primitive: &SketchPrimitive) -> String {
    match primitive {
        SketchPrimitive::Line { p1, p2 } => {
            format!("s.Line(point1={}, point2={})\n", point(*p1), point(*p2))
        }
        SketchPrimitive::ArcThreePoints { start, end, mid } => format!(
            "s.Arc3Points(point1={}, point2={}, point3={})\n",
            point(*start),
            point(*end),
            point(*mid)
        ),
        SketchPrimitive::ArcCenterEnds {
            center,
            start,
            end,
            clockwise,
        } => format!(
            "s.ArcByCenterEnds(center={}, direction={}, point1={}, point2={})\n",
            point(*center),
            if *clockwise { "CLOCKWISE" } else { "COUNTERCLOCKWISE" },
            point(*start),
            point(*end)
        ),
        SketchPrimitive::Spline { points } => {
            let coords: Vec<String> = points.iter().map(|p| format!("[{}, {}]", p.x, p.y)).collect();
            format!("s.Spline(points=[{}])\n", coords.join(", "))
        }
    }
}

/// Renders the journal script that replays the whole modeling recipe on the
/// host: sketch, part, material, section, partitions, implicit-dynamics step,
/// boundary conditions, mesh, job submission, and the result-report dump.
fn render_journal(
    config: &RunConfig,
    params: &NotchParameters,
    sketch: &[SketchPrimitive],
    report_path: &str,
) -> String {
    let names = &config.names;
    let NotchParameters { b, h, b0, h0, .. } = *params;

    let sheet_size = if h > b { h * 3.0 } else { b * 3.0 };

    let mut script = String::new();

    script.push_str(
        "from abaqus import *\n\
         from abaqusConstants import *\n\
         from caeModules import *\n\
         from mesh import *\n\
         import json\n\n",
    );

    // model and sketch
    script.push_str("Mdb()\n");
    script.push_str(&format!(
        "mdb.models.changeKey(fromName='Model-1', toName='{}')\n",
        names.model
    ));
    script.push_str(&format!("m = mdb.models['{}']\n", names.model));
    script.push_str(&format!(
        "m.ConstrainedSketch(name='{}', sheetSize={})\n",
        names.sketch, sheet_size
    ));
    script.push_str(&format!("s = m.sketches['{}']\n", names.sketch));
    script.push_str("s.sketchOptions.setValues(gridOrigin=(0.0, 0.0))\n");
    for primitive in sketch {
        script.push_str(&sketch_statement(primitive));
    }

    // part, material, section
    script.push_str(&format!(
        "\nm.Part(dimensionality=TWO_D_PLANAR, name='{}', type=DEFORMABLE_BODY)\n",
        names.part
    ));
    script.push_str(&format!("p = m.parts['{}']\n", names.part));
    script.push_str("p.BaseShell(sketch=s)\n");
    script.push_str(&format!("mat = m.Material(name='{}')\n", names.material));
    script.push_str(&format!(
        "mat.Elastic(table=(({}, {}), ))\n",
        config.material.youngs_modulus, config.material.poissons_ratio
    ));
    script.push_str(&format!(
        "mat.Density(table=(({}, ), ))\n",
        config.material.density
    ));
    script.push_str(
        "p.DatumPlaneByPrincipalPlane(offset=0.0, principalPlane=XZPLANE)\n\
         p.DatumPlaneByPrincipalPlane(offset=0.0, principalPlane=YZPLANE)\n\
         p.PartitionFaceByDatumPlane(datumPlane=p.datums[p.datums.keys()[0]], faces=p.faces)\n\
         p.PartitionFaceByDatumPlane(datumPlane=p.datums[p.datums.keys()[1]], faces=p.faces)\n",
    );
    script.push_str(&format!(
        "m.HomogeneousSolidSection(material='{mat}', name='Section-{part}', thickness=None)\n\
         p.Set(faces=p.faces, name='Set-{part}')\n\
         p.SectionAssignment(offset=0.0, offsetField='', offsetType=MIDDLE_SURFACE, \
         region=p.sets['Set-{part}'], sectionName='Section-{part}', \
         thicknessAssignment=FROM_SECTION)\n",
        mat = names.material,
        part = names.part
    ));

    // implicit dynamics step with nonlinear geometry
    script.push_str(&format!(
        "\nm.ImplicitDynamicsStep(alpha=DEFAULT, amplitude=RAMP, \
         application=MODERATE_DISSIPATION, initialConditions=ON, initialInc={init}, \
         maxNumInc={max_inc}, minInc={min_inc}, name='{step}', nlgeom=ON, nohaf=OFF, \
         previous='Initial')\n",
        init = config.step.initial_increment,
        max_inc = config.step.max_num_increments,
        min_inc = config.step.min_increment,
        step = names.step
    ));
    script.push_str(&format!(
        "m.fieldOutputRequests['F-Output-1'].setValues(timeInterval={ti})\n\
         m.historyOutputRequests['H-Output-1'].setValues(timeInterval={ti})\n\
         m.fieldOutputRequests['F-Output-1'].setValues(variables=('S', ))\n",
        ti = config.step.time_interval
    ));

    // assembly instance and boundary conditions located by coordinate probes
    script.push_str(&format!(
        "\nroot = m.rootAssembly\n\
         root.DatumCsysByDefault(CARTESIAN)\n\
         root.Instance(dependent=ON, name='{inst}', part=p)\n\
         inst = root.instances['{inst}']\n",
        inst = names.instance
    ));
    script.push_str(&format!(
        "root.Set(edges=inst.edges.findAt((({x}, {y}, 0.0), )), name='Set-Disp-{part}')\n\
         m.DisplacementBC(amplitude=UNSET, createStepName='{step}', distributionType=UNIFORM, \
         fieldName='', fixed=OFF, localCsys=None, name='BC-Disp-U2-{part}', \
         region=root.sets['Set-Disp-{part}'], u1=UNSET, u2={u2}, ur3=UNSET)\n",
        x = -b0 / 2.0,
        y = h - h0,
        part = names.part,
        step = names.step,
        u2 = config.loadcase.u2
    ));
    script.push_str(&format!(
        "root.Set(edges=inst.edges.findAt((({x}, {y1}, 0.0), ), (({x}, {y2}, 0.0), ), ), \
         name='Set-Disp-U1LCK-{part}')\n\
         m.DisplacementBC(amplitude=UNSET, createStepName='Initial', distributionType=UNIFORM, \
         fieldName='', localCsys=None, name='BC-Disp-U1LCK-{part}', \
         region=root.sets['Set-Disp-U1LCK-{part}'], u1=SET, u2=UNSET, ur3=UNSET)\n",
        x = -b0,
        y1 = -h0 / 2.0,
        y2 = (h - h0) / 2.0,
        part = names.part
    ));
    script.push_str(&format!(
        "root.Set(edges=inst.edges.findAt((({x1}, {y}, 0.0), ), (({x2}, {y}, 0.0), ), ), \
         name='Set-Disp-U2LCK-{part}')\n\
         m.DisplacementBC(amplitude=UNSET, createStepName='Initial', distributionType=UNIFORM, \
         fieldName='', localCsys=None, name='BC-Disp-U2LCK-{part}', \
         region=root.sets['Set-Disp-U2LCK-{part}'], u1=UNSET, u2=SET, ur3=UNSET)\n",
        x1 = -b0 / 2.0,
        x2 = (b - b0) / 2.0,
        y = -h0,
        part = names.part
    ));

    // quad-dominated mesh with quadratic elements, triangle fallback
    script.push_str(&format!(
        "\np.seedPart(deviationFactor={df}, minSizeFactor={msf}, size={size})\n\
         p.setMeshControls(algorithm=ADVANCING_FRONT, elemShape=QUAD_DOMINATED, regions=p.faces)\n\
         p.generateMesh()\n\
         p.setElementType(regions=(p.faces, ), elemTypes=(ElemType(elemCode=CPS8, \
         elemLibrary=STANDARD), ElemType(elemCode=CPS6, elemLibrary=STANDARD, \
         secondOrderAccuracy=OFF, distortionControl=DEFAULT)))\n",
        df = config.mesh.deviation_factor,
        msf = config.mesh.min_size_factor,
        size = config.mesh.size
    ));

    // job definition, submission, and blocking wait
    script.push_str(&format!(
        "\nmdb.Job(atTime=None, contactPrint=OFF, description='', echoPrint=OFF, \
         explicitPrecision=SINGLE, getMemoryFromAnalysis=True, historyPrint=OFF, \
         memory=90, memoryUnits=PERCENTAGE, model='{model}', modelPrint=OFF, \
         multiprocessingMode=DEFAULT, name='{job}', nodalOutputPrecision=SINGLE, \
         numCpus={cpus}, numDomains={cpus}, numGPUs={gpus}, queue=None, resultsFormat=ODB, \
         scratch='', type=ANALYSIS, userSubroutine='', waitHours=0, waitMinutes=0)\n\
         mdb.jobs['{job}'].writeInput()\n\
         mdb.jobs['{job}'].submit(consistencyChecking=ON)\n\
         mdb.jobs['{job}'].waitForCompletion()\n",
        model = names.model,
        job = names.job,
        cpus = config.job.num_cpus,
        gpus = config.job.num_gpus
    ));

    // dump the raw field and the face area for the extractor
    script.push_str(&format!(
        "\nodb = session.openOdb(name='{job}.odb')\n\
         values = odb.steps['{step}'].frames[-1].fieldOutputs['S'].values\n\
         report = {{\n\
         \x20   'step': '{step}',\n\
         \x20   'stress_values': [v.maxPrincipal for v in values],\n\
         \x20   'surface_area': float(p.getArea(p.faces)),\n\
         }}\n\
         with open(r'{report}', 'w') as fp:\n\
         \x20   json.dump(report, fp)\n",
        job = names.job,
        step = names.step,
        report = report_path
    ));

    script
}

impl CaeEngine for HostCae {
    fn build_geometry(
        &mut self,
        config: &RunConfig,
        params: &NotchParameters,
        sketch: &[SketchPrimitive],
    ) -> Result<(), NotchplateError> {
        let report_path = self.work_dir.join(REPORT_FILE);
        let journal_path = self.work_dir.join(format!("{}.py", config.names.job));

        // a stale report from an earlier run must never satisfy this run
        if report_path.exists() {
            if let Err(err) = std::fs::remove_file(&report_path) {
                return Err(NotchplateError::EngineFailure(format!(
                    "Unable to remove stale result report: {err}"
                )));
            }
        }

        let journal = render_journal(config, params, sketch, &report_path.display().to_string());

        if let Err(err) = std::fs::write(&journal_path, journal) {
            return Err(NotchplateError::EngineFailure(format!(
                "Failed to write journal script {}: {err}",
                journal_path.display()
            )));
        }

        println!(
            "info: rendered journal with {} sketch primitives to {}",
            sketch.len(),
            journal_path.display()
        );

        self.cae_command = Some(config.job.cae_command.clone());
        self.journal_path = Some(journal_path);

        Ok(())
    }

    fn submit_and_wait(&mut self) -> Result<(), NotchplateError> {
        let (cae_command, journal_path) = match (&self.cae_command, &self.journal_path) {
            (Some(c), Some(j)) => (c, j),
            _ => {
                return Err(NotchplateError::EngineFailure(
                    "No geometry has been built; nothing to submit".to_string(),
                ))
            }
        };

        println!("info: running {} in batch mode...", cae_command);
        let output = match std::process::Command::new(cae_command)
            .arg("cae")
            .arg(format!("noGUI={}", journal_path.display()))
            .current_dir(&self.work_dir)
            .output()
        {
            Ok(out) => out,
            Err(err) => {
                return Err(NotchplateError::EngineFailure(format!(
                    "Failed to launch CAE host '{cae_command}': {err}"
                )))
            }
        };

        if !output.status.success() {
            return Err(NotchplateError::EngineFailure(format!(
                "CAE host exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if !self.work_dir.join(REPORT_FILE).is_file() {
            return Err(NotchplateError::EngineFailure(
                "Job terminated without producing a result report".to_string(),
            ));
        }

        Ok(())
    }

    fn extract_field_sum(&mut self, step_name: &str) -> Result<f64, NotchplateError> {
        let report = self.read_report()?;

        if report["step"].as_str() != Some(step_name) {
            return Err(NotchplateError::EngineFailure(format!(
                "Result report does not cover step '{step_name}'"
            )));
        }

        let values = &report["stress_values"];
        if !values.is_array() {
            return Err(NotchplateError::EngineFailure(
                "Result report is missing stress_values".to_string(),
            ));
        }

        // deliberately a raw sum over integration points, with no averaging
        let mut sum = 0.0;
        for value in values.members() {
            match value.as_f64() {
                Some(v) => sum += v,
                None => {
                    return Err(NotchplateError::EngineFailure(
                        "Non-numeric stress value in result report".to_string(),
                    ))
                }
            }
        }

        Ok(sum)
    }

    fn query_area(&mut self) -> Result<f64, NotchplateError> {
        let report = self.read_report()?;

        match report["surface_area"].as_f64() {
            Some(area) => Ok(area),
            None => Err(NotchplateError::EngineFailure(
                "Result report is missing surface_area".to_string(),
            )),
        }
    }
}
