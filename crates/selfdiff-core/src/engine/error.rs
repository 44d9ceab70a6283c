use super::config::ConfigError;
use super::store::StoreError;
use crate::core::io::lammpstrj::LammpstrjError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Frame store failure: {0}")]
    Store(#[from] StoreError),

    #[error("PBC unwrapping of '{path}' failed: {source}", path = path.display())]
    Unwrap {
        path: PathBuf,
        #[source]
        source: LammpstrjError,
    },

    #[error("Correlation needs at least 2 frames, the source holds {found}")]
    NotEnoughFrames { found: usize },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
