use super::load_analysis;
use crate::cli::AnalysisArgs;
use crate::config::{self, Method};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use selfdiff::engine::progress::ProgressReporter;
use selfdiff::workflows;
use tracing::info;

pub fn run(args: AnalysisArgs, progress_handler: &CliProgressHandler) -> Result<()> {
    let config = config::finish(load_analysis(&args, Method::Msd)?)?;

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Computing the MSD of {} molecules over {} frames...",
        config.molecule.molecules,
        config.window.total()
    );
    info!("Invoking the core MSD workflow...");
    let result = workflows::msd::run(&config, &reporter)?;

    if let Some(unwrapped) = &result.unwrapped {
        println!(
            "✓ Unwrapped trajectory ({} frames) written to: {}",
            unwrapped.summary.frames,
            unwrapped.output_path.display()
        );
    }
    println!(
        "✓ MSD ({} lags) written to: {}",
        result.curve.values.len(),
        result.output_path.display()
    );
    Ok(())
}
