use std::path::Path;

use clap::{Parser, Subcommand};

use notchplate::{config, driver, engine::HostCae, error::NotchplateError, plotter, post_processor};

#[derive(Parser)]
#[command(name = "notchplate")]
#[command(about = "Notched-plate simulation workflow for an external CAE host")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build, mesh, and solve the plate model, then record the result row
    Run {
        /// Path to the input json file
        input: String,
    },
    /// Render stress/area charts from the recorded result files
    Plot {
        /// Directory containing the result files
        #[arg(default_value = ".")]
        dir: String,
    },
}

fn run_simulation(input: &str) -> Result<(), NotchplateError> {
    let config = config::load(input)?;

    let work_dir = match std::env::current_dir() {
        Ok(d) => d,
        Err(err) => {
            return Err(NotchplateError::Input(format!(
                "Unable to determine working directory: {err}"
            )))
        }
    };

    let mut engine = HostCae::new(work_dir.clone());
    let row = driver::run(&config, &mut engine)?;
    post_processor::append_result(&row, config.shape.kind(), &work_dir)?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run { input } => run_simulation(&input),
        Command::Plot { dir } => plotter::run(Path::new(&dir)),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
