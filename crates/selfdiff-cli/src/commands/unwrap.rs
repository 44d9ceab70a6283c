use crate::cli::UnwrapArgs;
use crate::config::{self, FileConfig, Overrides};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use selfdiff::engine::progress::ProgressReporter;
use selfdiff::workflows;
use tracing::{info, warn};

pub fn run(args: UnwrapArgs, progress_handler: &CliProgressHandler) -> Result<()> {
    let file_config = FileConfig::from_file(&args.config)?;
    let overrides = Overrides {
        set_values: &args.set_values,
        ..Default::default()
    };
    let builder = file_config
        .merge_with_cli(&overrides, None)?
        .unwrapped_path(args.output.clone());
    let config = config::finish(builder)?;
    if !config.pbc {
        warn!("`pbc` is not set in the configuration; unwrapping anyway.");
    }

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core unwrap workflow...");
    let result = workflows::unwrap::run(&config, &reporter)?;

    println!(
        "✓ Unwrapped {} frames of {} atoms into: {}",
        result.summary.frames,
        result.summary.atoms,
        result.output_path.display()
    );
    Ok(())
}
