//! # Core Module
//!
//! Fundamental building blocks shared by the engine and the workflows.
//!
//! - **Data models** ([`models`]) - frames of center-of-mass vectors, simulation boxes and the
//!   per-molecule mass table used to reduce atoms to molecules
//! - **Periodic boundaries** ([`pbc`]) - minimum-image unwrapping state for one unwrap pass
//! - **File I/O** ([`io`]) - the LAMMPS text trajectory format and the correlation result files

pub mod io;
pub mod models;
pub mod pbc;
