//! Random access to the center-of-mass frames of a trajectory window.

pub mod lammpstrj;

pub use lammpstrj::LammpstrjStore;

use super::config::{FrameWindow, TrajectoryFormat};
use crate::core::io::lammpstrj::{ColumnSet, LammpstrjError};
use crate::core::models::frame::Frame;
use crate::core::models::molecule::MoleculeSpec;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open trajectory '{path}': {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed trajectory: {0}")]
    Format(#[from] LammpstrjError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Frame {index} is outside the window of {total} frames")]
    OutOfRange { index: usize, total: usize },
    #[error("Trajectory ends after {found} frames, the window needs {required}")]
    ShortTrajectory { required: usize, found: usize },
    #[error("The frame window is empty")]
    EmptyWindow,
}

/// Anything the correlation engine can pull frames from.
///
/// `frame` takes `&mut self` because a non-resident frame moves the underlying file cursor.
/// Parallel sweeps call [`FrameSource::fork`] once per worker so every worker owns its cursor.
pub trait FrameSource: Sized + Send {
    /// Number of frames in the window (`Tot`).
    fn frame_count(&self) -> usize;

    /// Number of molecules per frame.
    fn molecule_count(&self) -> usize;

    fn frame(&mut self, index: usize) -> Result<Arc<Frame>, StoreError>;

    /// A second handle on the same frames, sharing resident data.
    fn fork(&self) -> Result<Self, StoreError>;
}

/// Frame store for one of the supported trajectory formats, chosen once when the file is opened.
#[derive(Debug)]
pub enum FrameStore {
    Lammpstrj(LammpstrjStore),
}

impl FrameStore {
    /// Scans the trajectory once: skips the frames before the window, indexes the non-resident
    /// frames of the window and decodes the resident ones.
    pub fn read(
        format: TrajectoryFormat,
        path: &Path,
        window: &FrameWindow,
        molecule: &MoleculeSpec,
        columns: &[ColumnSet],
    ) -> Result<Self, StoreError> {
        match format {
            TrajectoryFormat::Lammpstrj => {
                LammpstrjStore::open(path, window, molecule, columns).map(FrameStore::Lammpstrj)
            }
        }
    }

    /// Coordinate columns the frames were built from.
    pub fn column_set(&self) -> ColumnSet {
        match self {
            FrameStore::Lammpstrj(store) => store.layout().set(),
        }
    }

    /// Releases the file handle.
    pub fn close(self) {
        match self {
            FrameStore::Lammpstrj(store) => drop(store),
        }
    }
}

impl FrameSource for FrameStore {
    fn frame_count(&self) -> usize {
        match self {
            FrameStore::Lammpstrj(store) => store.frame_count(),
        }
    }

    fn molecule_count(&self) -> usize {
        match self {
            FrameStore::Lammpstrj(store) => store.molecule_count(),
        }
    }

    fn frame(&mut self, index: usize) -> Result<Arc<Frame>, StoreError> {
        match self {
            FrameStore::Lammpstrj(store) => store.frame(index),
        }
    }

    fn fork(&self) -> Result<Self, StoreError> {
        match self {
            FrameStore::Lammpstrj(store) => store.fork().map(FrameStore::Lammpstrj),
        }
    }
}

/// Frames built directly in memory.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct MemoryFrames {
    frames: Arc<[Arc<Frame>]>,
    molecules: usize,
}

#[cfg(test)]
impl MemoryFrames {
    /// All frames must hold the same number of molecules; the count of the first one is used.
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        let molecules = frames.first().map_or(0, Frame::len);
        Self {
            frames: frames.into_iter().map(Arc::new).collect(),
            molecules,
        }
    }
}

#[cfg(test)]
impl FrameSource for MemoryFrames {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn molecule_count(&self) -> usize {
        self.molecules
    }

    fn frame(&mut self, index: usize) -> Result<Arc<Frame>, StoreError> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(StoreError::OutOfRange {
                index,
                total: self.frames.len(),
            })
    }

    fn fork(&self) -> Result<Self, StoreError> {
        Ok(self.clone())
    }
}
