use crate::core::io::lammpstrj::LammpstrjError;
use crate::core::io::lammpstrj::unwrap::{UnwrapSummary, unwrap_trajectory};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrapResult {
    pub output_path: PathBuf,
    pub summary: UnwrapSummary,
}

/// Writes the unwrapped copy of `config.trajectory_path` to `config.unwrapped_path()`.
///
/// The whole file is converted, independently of the frame window.
#[instrument(skip_all, name = "unwrap_workflow")]
pub fn run(
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<UnwrapResult, EngineError> {
    config.validate()?;
    config.check_unwrap_target()?;
    if config.molecule.atoms_per_molecule > 1 && config.bond_cutoff.iter().all(|d| *d == 0.0) {
        warn!("`msd-dist` is zero; every atom away from its molecule's first atom will be shifted.");
    }
    let input_path = config.trajectory_path.clone();
    let output_path = config.unwrapped_path();
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "Unwrapping periodic trajectory."
    );

    reporter.phase("PBC Unwrapping", || -> Result<_, EngineError> {
        let input = File::open(&input_path).map_err(|source| EngineError::Unwrap {
            path: input_path.clone(),
            source: LammpstrjError::Io(source),
        })?;
        let output = File::create(&output_path).map_err(|source| EngineError::Output {
            path: output_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(output);

        reporter.report(Progress::TaskStart { total_steps: 0 });
        let summary = unwrap_trajectory(
            BufReader::new(input),
            &mut writer,
            &config.molecule,
            &config.bond_cutoff,
            |_| reporter.report(Progress::TaskIncrement),
        )
        .map_err(|source| EngineError::Unwrap {
            path: input_path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| EngineError::Output {
            path: output_path.clone(),
            source,
        })?;
        reporter.report(Progress::TaskFinish);

        info!(
            frames = summary.frames,
            atoms = summary.atoms,
            "Unwrapped trajectory written."
        );
        Ok(UnwrapResult {
            output_path: output_path.clone(),
            summary,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{AnalysisConfigBuilder, ConfigError};
    use std::fs;
    use tempfile::tempdir;

    const WRAPPED: &str = "\
ITEM: TIMESTEP
0
ITEM: NUMBER OF ATOMS
1
ITEM: BOX BOUNDS pp pp pp
0 10
0 10
0 10
ITEM: ATOMS id type x y z
1 1 9 5 5
ITEM: TIMESTEP
1
ITEM: NUMBER OF ATOMS
1
ITEM: BOX BOUNDS pp pp pp
0 10
0 10
0 10
ITEM: ATOMS id type x y z
1 1 0.5 5 5
";

    #[test]
    fn writes_the_nopbc_copy_next_to_the_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.lammpstrj");
        fs::write(&input, WRAPPED).unwrap();
        let config = AnalysisConfigBuilder::new()
            .trajectory_path(input)
            .end(2)
            .molecules(1)
            .atoms_per_molecule(1)
            .masses(vec![1.0])
            .timestep(1.0)
            .pbc(true)
            .build()
            .unwrap();

        let result = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.output_path, dir.path().join("run_nopbc.lammpstrj"));
        assert_eq!(result.summary.frames, 2);
        let written = fs::read_to_string(&result.output_path).unwrap();
        assert!(written.contains("ITEM: ATOMS id type xu yu zu"));
        assert!(written.ends_with("1 1 10.5 5 5\n"));
    }

    #[test]
    fn output_pointing_at_the_input_leaves_it_untouched() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.lammpstrj");
        fs::write(&input, WRAPPED).unwrap();
        let config = AnalysisConfigBuilder::new()
            .trajectory_path(input.clone())
            .unwrapped_path(Some(input.clone()))
            .end(2)
            .molecules(1)
            .atoms_per_molecule(1)
            .masses(vec![1.0])
            .timestep(1.0)
            .pbc(true)
            .build()
            .unwrap();

        let err = run(&config, &ProgressReporter::new()).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Config(ConfigError::Invalid {
                parameter: "output",
                ..
            })
        ));
        assert_eq!(fs::read_to_string(&input).unwrap(), WRAPPED);
    }

    #[test]
    fn missing_input_is_an_unwrap_error() {
        let dir = tempdir().unwrap();
        let config = AnalysisConfigBuilder::new()
            .trajectory_path(dir.path().join("missing.lammpstrj"))
            .end(2)
            .molecules(1)
            .atoms_per_molecule(1)
            .masses(vec![1.0])
            .timestep(1.0)
            .build()
            .unwrap();

        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Unwrap {
                source: LammpstrjError::Io(_),
                ..
            }
        ));
    }
}
