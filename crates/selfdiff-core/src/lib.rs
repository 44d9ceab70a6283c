//! # selfdiff Core Library
//!
//! Post-processing of molecular-dynamics trajectories into two time-correlation observables:
//! the mean-squared displacement (MSD) and the velocity autocorrelation function (VAC), both
//! used to estimate self-diffusion coefficients.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Frame`, `SimulationBox`,
//!   `MoleculeSpec`), the periodic-boundary unwrapping state, and the LAMMPS trajectory
//!   reader/writer.
//!
//! - **[`engine`]: The Logic Core.** The paged `FrameStore` that gives random access to
//!   center-of-mass frames under a memory budget, and the O(T²) `CorrelationEngine`
//!   instantiated for MSD and VAC.
//!
//! - **[`workflows`]: The Public API.** End-to-end runs (unwrap, MSD, VAC) that take a validated
//!   `AnalysisConfig`, drive the engine, and write result files.

pub mod core;
pub mod engine;
pub mod workflows;
