//! LAMMPS text trajectory format (`.lammpstrj`).
//!
//! A frame is nine header lines followed by one record per atom:
//!
//! ```text
//! ITEM: TIMESTEP
//! 1000
//! ITEM: NUMBER OF ATOMS
//! 6
//! ITEM: BOX BOUNDS pp pp pp
//! 0.0 10.0
//! 0.0 10.0
//! 0.0 10.0
//! ITEM: ATOMS id type x y z
//! 1 1 0.5 0.5 0.5
//! ...
//! ```
//!
//! Coordinate columns are located by label: `x y z` (wrapped), `xu yu zu` (unwrapped) or
//! `vx vy vz` (velocities). The layout found in the first `ITEM: ATOMS` line is fixed for the
//! whole file.

pub mod columns;
pub mod header;
pub mod reader;
pub mod unwrap;

pub use columns::{AtomRecord, ColumnLayout, ColumnSet};
pub use header::FrameHeader;
pub use reader::LineReader;

use std::io;
use thiserror::Error;

/// Number of header lines preceding the atom records of every frame.
pub const HEADER_LINES: usize = 9;

#[derive(Debug, Error)]
pub enum LammpstrjError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Unexpected end of file after line {line} while reading {step}")]
    UnexpectedEof { line: usize, step: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("Expected an '{expected}' line, found '{found}'")]
    UnexpectedItem {
        expected: &'static str,
        found: String,
    },
    #[error("Invalid integer for {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in column '{column}' (value: '{value}')")]
    InvalidFloat { column: String, value: String },
    #[error("Box bounds line must hold exactly two values, found {found}")]
    MalformedBoxBounds { found: usize },
    #[error("'ITEM: ATOMS' line lists no columns")]
    NotEnoughColumns,
    #[error("Missing coordinate columns: expected one of {expected}")]
    MissingColumns { expected: String },
    #[error("Atom record has {found} columns but the layout expects {expected}")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("Column layout changed mid-file: expected '{expected}', found '{found}'")]
    LayoutChanged { expected: String, found: String },
    #[error("Frame declares {found} atoms but {expected} are expected")]
    AtomCountMismatch { expected: usize, found: usize },
}

impl LammpstrjError {
    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Self {
        Self::Parse { line, kind }
    }
}
