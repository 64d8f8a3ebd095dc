use std::time::Duration;

use indicatif::ProgressBar;

use crate::{
    datatypes::{ResultRow, RunConfig},
    engine::CaeEngine,
    error::NotchplateError,
    sketch,
};

/// Runs one simulation through the external engine
///
/// Validates the geometry, builds the sketch, and drives the engine through
/// its fixed call sequence. Validation failures abort before any engine call;
/// engine failures are fatal with no retry.
///
/// # Arguments
/// * `config` - The run configuration
/// * `engine` - The CAE engine implementation to drive
///
/// # Returns
/// The ResultRow for the completed run
pub fn run(config: &RunConfig, engine: &mut dyn CaeEngine) -> Result<ResultRow, NotchplateError> {
    let params = sketch::validate(&config.plate, &config.shape)?;
    println!(
        "info: validated {} notch geometry for part '{}'",
        config.shape.kind().label(),
        config.names.part
    );

    let primitives = sketch::build_sketch(&params);

    engine.build_geometry(config, &params, &primitives)?;

    // the job is the only long-running stage; keep a spinner up while blocked
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("waiting for job '{}'", config.names.job));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let submission = engine.submit_and_wait();
    spinner.finish_and_clear();
    submission?;

    let row = crate::post_processor::extract_results(engine, &config.names.step)?;

    println!(
        "info: stress sum {:.6} MPa over surface area {:.6} mm^2",
        row.stress_sum, row.surface_area
    );

    Ok(row)
}
