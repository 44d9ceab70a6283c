use super::load_analysis;
use crate::cli::AnalysisArgs;
use crate::config::{self, Method};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use selfdiff::engine::progress::ProgressReporter;
use selfdiff::workflows;
use tracing::info;

pub fn run(args: AnalysisArgs, progress_handler: &CliProgressHandler) -> Result<()> {
    let config = config::finish(load_analysis(&args, Method::Vac)?)?;

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Computing the VAC of {} molecules over {} frames...",
        config.molecule.molecules,
        config.window.total()
    );
    info!("Invoking the core VAC workflow...");
    let result = workflows::vac::run(&config, &reporter)?;

    println!(
        "✓ VAC (integral {:.6}) written to: {}",
        result.curve.integral,
        result.output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::test_utils::write_case;
    use crate::error::CliError;
    use clap::Parser;
    use selfdiff::engine::error::EngineError;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> AnalysisArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Vac(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn run_cli(args: &[&str]) -> Result<()> {
        run(parse(args), &CliProgressHandler::hidden())
    }

    #[test]
    fn vac_command_writes_next_to_the_trajectory() {
        let dir = tempdir().unwrap();
        let config = write_case(
            dir.path(),
            "vx vy vz",
            &[[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            "method = \"vac\"\n",
        );

        run_cli(&["selfdiff", "vac", "-c", config.to_str().unwrap()]).unwrap();

        let written = fs::read_to_string(dir.path().join("traj.lammpstrj_vac.out")).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Integral 0.333"));
        assert!(lines[1].starts_with("0.5 0.333"));
    }

    #[test]
    fn window_overrides_are_validated() {
        let dir = tempdir().unwrap();
        let config = write_case(dir.path(), "vx vy vz", &[[1.0; 3], [2.0; 3]], "");

        let result = run_cli(&["selfdiff", "vac", "-c", config.to_str().unwrap(), "--start", "1"]);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn short_trajectory_is_a_core_error() {
        let dir = tempdir().unwrap();
        let config = write_case(dir.path(), "vx vy vz", &[[1.0; 3], [2.0; 3]], "");

        let result = run_cli(&["selfdiff", "vac", "-c", config.to_str().unwrap(), "--end", "5"]);
        assert!(matches!(result, Err(CliError::Core(EngineError::Store(_)))));
    }
}
