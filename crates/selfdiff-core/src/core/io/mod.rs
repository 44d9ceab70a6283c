//! Input/output for trajectory and result files.
//!
//! [`lammpstrj`] reads and rewrites LAMMPS text trajectories (`dump ... custom`), including the
//! streaming PBC unwrap pass. [`results`] writes the MSD and VAC curves through the
//! [`traits::ResultFile`] interface.

pub mod lammpstrj;
pub mod results;
pub mod traits;
