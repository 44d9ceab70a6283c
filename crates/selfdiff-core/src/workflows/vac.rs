use super::write_result;
use crate::core::io::lammpstrj::ColumnSet;
use crate::core::models::correlation::VacCurve;
use crate::engine::config::AnalysisConfig;
use crate::engine::correlation::CorrelationEngine;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::store::FrameStore;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct VacResult {
    pub curve: VacCurve,
    pub output_path: PathBuf,
}

/// Velocity autocorrelation of the molecular centers of mass, read from the `vx vy vz` columns.
#[instrument(skip_all, name = "vac_workflow")]
pub fn run(config: &AnalysisConfig, reporter: &ProgressReporter) -> Result<VacResult, EngineError> {
    config.validate()?;
    if config.pbc {
        warn!("`pbc` has no effect on velocities and is ignored.");
    }

    let mut store = reporter.phase("Indexing Frames", || {
        FrameStore::read(
            config.format,
            &config.trajectory_path,
            &config.window,
            &config.molecule,
            &[ColumnSet::Velocity],
        )
        .map_err(EngineError::from)
    })?;

    let engine = CorrelationEngine::new(reporter);
    let curve = reporter.phase("VAC Sweep", || engine.vac(&mut store, config.timestep))?;
    store.close();

    let output_path = config.vac_output_path();
    reporter.phase("Writing Results", || write_result(&curve, &output_path))?;
    info!(
        output = %output_path.display(),
        integral = curve.integral,
        "VAC written."
    );

    Ok(VacResult { curve, output_path })
}
