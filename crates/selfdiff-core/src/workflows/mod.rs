//! # Workflows Module
//!
//! End-to-end runs of the library, each one taking a validated
//! [`AnalysisConfig`](crate::engine::config::AnalysisConfig) and a progress reporter.
//!
//! - **Unwrap** ([`unwrap`]) - writes an unwrapped copy of a wrapped LAMMPS trajectory
//! - **MSD** ([`msd`]) - optional unwrap, then the mean-squared displacement of the molecular
//!   centers of mass, written to a result file
//! - **VAC** ([`vac`]) - velocity autocorrelation of the molecular centers of mass and its
//!   integral, written to a result file

pub mod msd;
pub mod unwrap;
pub mod vac;

use crate::core::io::traits::ResultFile;
use crate::engine::error::EngineError;
use std::io;
use std::path::Path;

fn write_result<T>(result: &T, path: &Path) -> Result<(), EngineError>
where
    T: ResultFile<Error = io::Error>,
{
    result
        .write_to_path(path)
        .map_err(|source| EngineError::Output {
            path: path.to_path_buf(),
            source,
        })
}
