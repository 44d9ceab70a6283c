//! # Engine Module
//!
//! The stateful part of the library: it turns a trajectory file into center-of-mass frames and
//! sweeps every pair of frames to build a correlation curve.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - analysis parameters, the frame window and their validation
//! - **Frame access** ([`store`]) - two-tier frame store: the last frames of the window stay
//!   resident, the others are re-read from disk through a byte-offset index
//! - **Correlation** ([`correlation`]) - the O(T²) pair sweep, generic over the per-pair
//!   contribution, with MSD and VAC kernels
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - the engine error type surfaced by every workflow
//!
//! ## Parallelism
//!
//! With the `parallel` feature (enabled by default) the outer loop of the sweep is spread over
//! the rayon thread pool. Each worker opens its own handle on the trajectory and accumulates into
//! its own lag array; partial arrays are merged in worker order once every worker is done.

pub mod config;
pub mod correlation;
pub mod error;
pub mod progress;
pub mod store;
