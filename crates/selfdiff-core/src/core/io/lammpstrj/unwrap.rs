//! Streaming conversion of a wrapped trajectory into an unwrapped one.

use super::columns::{ColumnLayout, ColumnSet};
use super::header::FrameHeader;
use super::reader::LineReader;
use super::LammpstrjError;
use crate::core::models::molecule::MoleculeSpec;
use crate::core::pbc::{ImageShift, UnwrapState, make_whole};
use nalgebra::Vector3;
use std::io::{BufRead, Write};

/// Totals of one unwrap pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwrapSummary {
    pub frames: usize,
    pub atoms: usize,
}

/// Reads a wrapped trajectory frame by frame and writes the unwrapped trajectory to `writer`.
///
/// The first frame is made whole molecule by molecule using `bond_cutoff` as the largest
/// intramolecular distance per axis; every later frame is unwrapped atom by atom against the
/// previous one. Only one line is held in memory at a time, plus two vectors per atom.
/// `on_frame` is called after each frame has been written.
///
/// # Errors
///
/// Any I/O failure, malformed header, missing `x y z` columns, layout change, atom record
/// column-count mismatch or premature end of file aborts the pass.
pub fn unwrap_trajectory<R, W, F>(
    reader: R,
    writer: &mut W,
    molecule: &MoleculeSpec,
    bond_cutoff: &Vector3<f64>,
    mut on_frame: F,
) -> Result<UnwrapSummary, LammpstrjError>
where
    R: BufRead,
    W: Write,
    F: FnMut(usize),
{
    let mut reader = LineReader::new(reader);
    let total_atoms = molecule.total_atoms();

    let header = FrameHeader::read(&mut reader, total_atoms)?;
    let layout = ColumnLayout::detect(&header.columns, &[ColumnSet::Wrapped])
        .map_err(|kind| LammpstrjError::parse(reader.line(), kind))?;
    let atoms_header = layout.unwrapped_header();
    write_header(writer, &header, &atoms_header)?;

    let lengths = header.sim_box.lengths();
    let mut state = UnwrapState::with_capacity(total_atoms);
    for _ in 0..molecule.molecules {
        let mut reference = Vector3::zeros();
        for atom in 0..molecule.atoms_per_molecule {
            let (line_num, line) = reader.next_line("atom records")?;
            let record = layout
                .decode(line)
                .map_err(|kind| LammpstrjError::parse(line_num, kind))?;
            reference = if atom == 0 {
                record.vector
            } else {
                make_whole(&record.vector, &reference, &lengths, bond_cutoff)
            };
            state.seed(reference);
            writeln!(writer, "{}", layout.encode(&record, &reference))?;
        }
    }

    let mut frames = 1;
    on_frame(frames);

    while !reader.is_at_end()? {
        let header = FrameHeader::read(&mut reader, total_atoms)?;
        layout
            .ensure_same(&header.columns)
            .map_err(|kind| LammpstrjError::parse(reader.line(), kind))?;
        write_header(writer, &header, &atoms_header)?;

        let shift = ImageShift::from(&header.sim_box);
        for atom in 0..total_atoms {
            let (line_num, line) = reader.next_line("atom records")?;
            let record = layout
                .decode(line)
                .map_err(|kind| LammpstrjError::parse(line_num, kind))?;
            let unwrapped = state.advance(atom, &record.vector, &shift);
            writeln!(writer, "{}", layout.encode(&record, &unwrapped))?;
        }

        frames += 1;
        on_frame(frames);
    }

    Ok(UnwrapSummary {
        frames,
        atoms: total_atoms,
    })
}

fn write_header<W: Write>(
    writer: &mut W,
    header: &FrameHeader,
    atoms_header: &str,
) -> Result<(), LammpstrjError> {
    for line in &header.raw_lines {
        writeln!(writer, "{}", line)?;
    }
    writeln!(writer, "{}", atoms_header)?;
    Ok(())
}
