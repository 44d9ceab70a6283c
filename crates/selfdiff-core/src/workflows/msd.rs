use super::unwrap::{self, UnwrapResult};
use super::write_result;
use crate::core::io::lammpstrj::ColumnSet;
use crate::core::models::correlation::MsdCurve;
use crate::engine::config::AnalysisConfig;
use crate::engine::correlation::CorrelationEngine;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::store::FrameStore;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct MsdResult {
    pub curve: MsdCurve,
    pub output_path: PathBuf,
    /// Set when the trajectory was unwrapped first.
    pub unwrapped: Option<UnwrapResult>,
}

#[instrument(skip_all, name = "msd_workflow")]
pub fn run(config: &AnalysisConfig, reporter: &ProgressReporter) -> Result<MsdResult, EngineError> {
    config.validate()?;

    // === Phase 1: PBC unwrapping (optional) ===
    let unwrapped = if config.pbc {
        Some(unwrap::run(config, reporter)?)
    } else {
        None
    };

    // === Phase 2: Index the window and load resident frames ===
    let trajectory = config.msd_trajectory_path();
    let mut store = reporter.phase("Indexing Frames", || {
        FrameStore::read(
            config.format,
            &trajectory,
            &config.window,
            &config.molecule,
            ColumnSet::POSITIONS,
        )
        .map_err(EngineError::from)
    })?;
    if store.column_set() == ColumnSet::Wrapped {
        warn!("MSD computed from wrapped coordinates; set `pbc` to unwrap them first.");
    }

    // === Phase 3: Pair sweep ===
    let engine = CorrelationEngine::new(reporter);
    let curve = reporter.phase("MSD Sweep", || engine.msd(&mut store, config.timestep))?;
    store.close();

    // === Phase 4: Result file ===
    let output_path = config.msd_output_path();
    reporter.phase("Writing Results", || write_result(&curve, &output_path))?;
    info!(output = %output_path.display(), lags = curve.values.len(), "MSD written.");

    Ok(MsdResult {
        curve,
        output_path,
        unwrapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnalysisConfigBuilder;
    use crate::workflows::test_utils::single_atom_trajectory;
    use std::fs;
    use tempfile::tempdir;

    fn builder(path: PathBuf, frames: usize) -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
            .trajectory_path(path)
            .end(frames)
            .resident_frames(1)
            .molecules(1)
            .atoms_per_molecule(1)
            .masses(vec![1.0])
            .timestep(1.0)
    }

    #[test]
    fn msd_of_unwrapped_positions_is_written_next_to_the_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("line.lammpstrj");
        let text = single_atom_trajectory(
            "xu yu zu",
            100.0,
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
        );
        fs::write(&input, text).unwrap();
        let config = builder(input, 3).build().unwrap();

        let result = run(&config, &ProgressReporter::new()).unwrap();

        assert!(result.unwrapped.is_none());
        assert_eq!(result.output_path, dir.path().join("line.lammpstrj_msd.out"));
        let written = fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(written, "1 0.8333333333333334\n2 3\n");
    }

    #[test]
    fn pbc_runs_the_unwrap_pass_first() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("box.lammpstrj");
        let text = single_atom_trajectory("x y z", 10.0, &[[9.0, 5.0, 5.0], [0.5, 5.0, 5.0]]);
        fs::write(&input, text).unwrap();
        let config = builder(input, 2).pbc(true).build().unwrap();

        let result = run(&config, &ProgressReporter::new()).unwrap();

        let unwrapped = result.unwrapped.unwrap();
        assert_eq!(unwrapped.output_path, dir.path().join("box_nopbc.lammpstrj"));
        assert_eq!(
            result.output_path,
            dir.path().join("box_nopbc.lammpstrj_msd.out")
        );
        assert!((result.curve.values[0] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn explicit_output_path_is_honored() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("line.lammpstrj");
        let text = single_atom_trajectory("xu yu zu", 100.0, &[[0.0; 3], [0.0, 2.0, 0.0]]);
        fs::write(&input, text).unwrap();
        let output = dir.path().join("custom.dat");
        let config = builder(input, 2)
            .output_path(Some(output.clone()))
            .build()
            .unwrap();

        run(&config, &ProgressReporter::new()).unwrap();

        let written = fs::read_to_string(output).unwrap();
        assert!(written.starts_with("1 1.3333333333333333"));
    }
}
