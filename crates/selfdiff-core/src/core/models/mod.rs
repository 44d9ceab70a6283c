//! # Core Models Module
//!
//! Plain data types describing what a trajectory frame holds once it has been read.
//!
//! - [`correlation`] - normalized MSD and VAC curves
//! - [`frame`] - one snapshot reduced to one vector per molecule
//! - [`simulation_box`] - orthorhombic periodic box of a single frame
//! - [`molecule`] - molecule/atom counts and the shared mass table

pub mod correlation;
pub mod frame;
pub mod molecule;
pub mod simulation_box;
