use crate::core::models::molecule::MoleculeSpec;
use nalgebra::Vector3;
use serde::Deserialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            parameter,
            reason: reason.into(),
        }
    }
}

/// Trajectory file formats understood by the frame store and the unwrap pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajectoryFormat {
    /// LAMMPS text dump (`dump custom`).
    #[default]
    Lammpstrj,
}

impl fmt::Display for TrajectoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryFormat::Lammpstrj => write!(f, "lammpstrj"),
        }
    }
}

/// Selects the frames `[start, end)` of the trajectory and how many of them stay in memory.
///
/// Inside the window frames are numbered from 0. The last `resident` frames are decoded once and
/// kept; the first `total() - resident` are only indexed and re-read on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: usize,
    pub end: usize,
    pub resident: usize,
}

impl FrameWindow {
    pub fn new(start: usize, end: usize, resident: usize) -> Self {
        Self {
            start,
            end,
            resident,
        }
    }

    /// Number of frames in the window (`Tot`).
    #[inline]
    pub fn total(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Window index of the first resident frame.
    #[inline]
    pub fn first_resident(&self) -> usize {
        self.total().saturating_sub(self.resident)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end <= self.start {
            return Err(ConfigError::invalid(
                "end",
                format!("must be greater than start ({})", self.start),
            ));
        }
        if self.total() == 1 {
            return Err(ConfigError::invalid(
                "end",
                "the window must hold at least two frames (end - start != 1)",
            ));
        }
        if self.resident > self.total() {
            return Err(ConfigError::invalid(
                "mem",
                format!(
                    "cannot keep {} frames resident in a window of {}",
                    self.resident,
                    self.total()
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub trajectory_path: PathBuf,
    pub format: TrajectoryFormat,
    /// The trajectory holds wrapped coordinates and must be unwrapped before the MSD.
    pub pbc: bool,
    pub window: FrameWindow,
    pub molecule: MoleculeSpec,
    /// Largest intramolecular distance along each axis, used to make first-frame molecules whole.
    pub bond_cutoff: Vector3<f64>,
    /// Time between two consecutive frames, in any unit.
    pub timestep: f64,
    pub output_path: Option<PathBuf>,
    pub unwrapped_path: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Checks every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;

        let molecule = &self.molecule;
        if molecule.molecules == 0 {
            return Err(ConfigError::invalid("mol", "must be greater than 0"));
        }
        if molecule.atoms_per_molecule == 0 {
            return Err(ConfigError::invalid("at", "must be greater than 0"));
        }
        if molecule.masses.len() != molecule.atoms_per_molecule {
            return Err(ConfigError::invalid(
                "masses",
                format!(
                    "{} masses given for {} atoms per molecule",
                    molecule.masses.len(),
                    molecule.atoms_per_molecule
                ),
            ));
        }
        if molecule.masses.iter().any(|m| !m.is_finite())
            || molecule.masses.iter().sum::<f64>() <= 0.0
        {
            return Err(ConfigError::invalid(
                "masses",
                "masses must be finite and sum to a positive value",
            ));
        }
        if self.timestep == 0.0 || !self.timestep.is_finite() {
            return Err(ConfigError::invalid("dt", "must be finite and non-zero"));
        }
        if self.bond_cutoff.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(ConfigError::invalid(
                "msd-dist",
                "distances must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Where the unwrap pass writes: `<stem>_nopbc.<ext>` next to the input unless overridden.
    pub fn unwrapped_path(&self) -> PathBuf {
        if let Some(path) = &self.unwrapped_path {
            return path.clone();
        }
        let stem = self
            .trajectory_path
            .file_stem()
            .map(OsString::from)
            .unwrap_or_default();
        let mut name = stem;
        name.push("_nopbc");
        if let Some(ext) = self.trajectory_path.extension() {
            name.push(".");
            name.push(ext);
        }
        self.trajectory_path.with_file_name(name)
    }

    /// Refuses an unwrap target that resolves to the input trajectory, which would be truncated
    /// before it is read.
    pub fn check_unwrap_target(&self) -> Result<(), ConfigError> {
        let output = self.unwrapped_path();
        if same_file(&self.trajectory_path, &output) {
            return Err(ConfigError::invalid(
                "output",
                format!("'{}' is the input trajectory", output.display()),
            ));
        }
        Ok(())
    }

    /// The file the MSD is computed from: the unwrapped copy when `pbc` is set.
    pub fn msd_trajectory_path(&self) -> PathBuf {
        if self.pbc {
            self.unwrapped_path()
        } else {
            self.trajectory_path.clone()
        }
    }

    pub fn msd_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| append_suffix(&self.msd_trajectory_path(), "_msd.out"))
    }

    pub fn vac_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| append_suffix(&self.trajectory_path, "_vac.out"))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    trajectory_path: Option<PathBuf>,
    format: Option<TrajectoryFormat>,
    pbc: Option<bool>,
    start: Option<usize>,
    end: Option<usize>,
    resident: Option<usize>,
    molecules: Option<usize>,
    atoms_per_molecule: Option<usize>,
    masses: Option<Vec<f64>>,
    bond_cutoff: Option<[f64; 3]>,
    timestep: Option<f64>,
    output_path: Option<PathBuf>,
    unwrapped_path: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trajectory_path(mut self, path: PathBuf) -> Self {
        self.trajectory_path = Some(path);
        self
    }
    pub fn format(mut self, format: TrajectoryFormat) -> Self {
        self.format = Some(format);
        self
    }
    pub fn pbc(mut self, pbc: bool) -> Self {
        self.pbc = Some(pbc);
        self
    }
    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }
    pub fn end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }
    pub fn resident_frames(mut self, resident: usize) -> Self {
        self.resident = Some(resident);
        self
    }
    pub fn molecules(mut self, molecules: usize) -> Self {
        self.molecules = Some(molecules);
        self
    }
    pub fn atoms_per_molecule(mut self, atoms: usize) -> Self {
        self.atoms_per_molecule = Some(atoms);
        self
    }
    pub fn masses(mut self, masses: Vec<f64>) -> Self {
        self.masses = Some(masses);
        self
    }
    pub fn bond_cutoff(mut self, cutoff: [f64; 3]) -> Self {
        self.bond_cutoff = Some(cutoff);
        self
    }
    pub fn timestep(mut self, dt: f64) -> Self {
        self.timestep = Some(dt);
        self
    }
    pub fn output_path(mut self, path: Option<PathBuf>) -> Self {
        self.output_path = path;
        self
    }
    pub fn unwrapped_path(mut self, path: Option<PathBuf>) -> Self {
        self.unwrapped_path = path;
        self
    }

    /// Assembles and validates the configuration. `format` defaults to `lammpstrj`, `pbc` to
    /// `false`, `start` and the resident frame count to 0, and the bond cutoff to zero.
    ///
    /// The bond cutoff is required when `pbc` is set and molecules have more than one atom.
    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let pbc = self.pbc.unwrap_or(false);
        let window = FrameWindow::new(
            self.start.unwrap_or(0),
            self.end.ok_or(ConfigError::MissingParameter("end"))?,
            self.resident.unwrap_or(0),
        );
        let molecule = MoleculeSpec::new(
            self.molecules
                .ok_or(ConfigError::MissingParameter("mol"))?,
            self.atoms_per_molecule
                .ok_or(ConfigError::MissingParameter("at"))?,
            self.masses.ok_or(ConfigError::MissingParameter("masses"))?,
        );
        if pbc && molecule.atoms_per_molecule > 1 && self.bond_cutoff.is_none() {
            return Err(ConfigError::MissingParameter("msd-dist"));
        }
        let config = AnalysisConfig {
            trajectory_path: self
                .trajectory_path
                .ok_or(ConfigError::MissingParameter("trajectory"))?,
            format: self.format.unwrap_or_default(),
            pbc,
            window,
            molecule,
            bond_cutoff: Vector3::from(self.bond_cutoff.unwrap_or([0.0; 3])),
            timestep: self.timestep.ok_or(ConfigError::MissingParameter("dt"))?,
            output_path: self.output_path,
            unwrapped_path: self.unwrapped_path,
        };
        config.validate()?;
        Ok(config)
    }
}
