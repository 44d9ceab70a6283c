use super::reader::LineReader;
use super::{HEADER_LINES, LammpstrjError, ParseErrorKind};
use crate::core::models::simulation_box::SimulationBox;
use nalgebra::Vector3;
use std::io::BufRead;

const ITEM_TIMESTEP: &str = "ITEM: TIMESTEP";
const ITEM_NUMBER_OF_ATOMS: &str = "ITEM: NUMBER OF ATOMS";
const ITEM_BOX_BOUNDS: &str = "ITEM: BOX BOUNDS";
const ITEM_ATOMS: &str = "ITEM: ATOMS";

/// The nine header lines of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
    pub timestep: u64,
    pub atoms: usize,
    pub sim_box: SimulationBox,
    /// Column labels following `ITEM: ATOMS`.
    pub columns: Vec<String>,
    /// The eight lines before `ITEM: ATOMS`, verbatim and without line terminators.
    pub raw_lines: Vec<String>,
}

impl FrameHeader {
    /// Reads one frame header and checks that it announces `expected_atoms` atom records.
    ///
    /// # Errors
    ///
    /// Fails on a missing or misplaced `ITEM:` line, an unparsable count or timestep, a box
    /// bounds line that does not hold exactly two numbers, an atom count different from
    /// `expected_atoms`, or a premature end of file.
    pub fn read<R: BufRead>(
        reader: &mut LineReader<R>,
        expected_atoms: usize,
    ) -> Result<Self, LammpstrjError> {
        let mut raw_lines = Vec::with_capacity(HEADER_LINES - 1);

        let (line_num, line) = reader.next_line("timestep header")?;
        expect_item(line, ITEM_TIMESTEP, line_num)?;
        raw_lines.push(line.to_string());

        let (line_num, line) = reader.next_line("timestep")?;
        let timestep = parse_int(line, "timestep", line_num)?;
        raw_lines.push(line.to_string());

        let (line_num, line) = reader.next_line("atom count header")?;
        expect_item(line, ITEM_NUMBER_OF_ATOMS, line_num)?;
        raw_lines.push(line.to_string());

        let (line_num, line) = reader.next_line("atom count")?;
        let atoms = parse_int(line, "number of atoms", line_num)? as usize;
        if atoms != expected_atoms {
            return Err(LammpstrjError::parse(
                line_num,
                ParseErrorKind::AtomCountMismatch {
                    expected: expected_atoms,
                    found: atoms,
                },
            ));
        }
        raw_lines.push(line.to_string());

        let (line_num, line) = reader.next_line("box bounds header")?;
        expect_item(line, ITEM_BOX_BOUNDS, line_num)?;
        raw_lines.push(line.to_string());

        let mut lo = Vector3::zeros();
        let mut hi = Vector3::zeros();
        for k in 0..3 {
            let (line_num, line) = reader.next_line("box bounds")?;
            let (l, h) = parse_bounds(line, line_num)?;
            lo[k] = l;
            hi[k] = h;
            raw_lines.push(line.to_string());
        }

        let (line_num, line) = reader.next_line("atoms header")?;
        expect_item(line, ITEM_ATOMS, line_num)?;
        let columns = line
            .trim_start()
            .trim_start_matches(ITEM_ATOMS)
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Self {
            timestep,
            atoms,
            sim_box: SimulationBox::new(lo, hi),
            columns,
            raw_lines,
        })
    }
}

fn expect_item(line: &str, expected: &'static str, line_num: usize) -> Result<(), LammpstrjError> {
    if line.trim_start().starts_with(expected) {
        Ok(())
    } else {
        Err(LammpstrjError::parse(
            line_num,
            ParseErrorKind::UnexpectedItem {
                expected,
                found: line.trim().to_string(),
            },
        ))
    }
}

fn parse_int(line: &str, field: &'static str, line_num: usize) -> Result<u64, LammpstrjError> {
    let value = line.trim();
    value.parse().map_err(|_| {
        LammpstrjError::parse(
            line_num,
            ParseErrorKind::InvalidInt {
                field,
                value: value.to_string(),
            },
        )
    })
}

fn parse_bounds(line: &str, line_num: usize) -> Result<(f64, f64), LammpstrjError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(LammpstrjError::parse(
            line_num,
            ParseErrorKind::MalformedBoxBounds {
                found: fields.len(),
            },
        ));
    }
    let parse = |value: &str| {
        value.parse::<f64>().map_err(|_| {
            LammpstrjError::parse(
                line_num,
                ParseErrorKind::InvalidFloat {
                    column: "box bounds".into(),
                    value: value.to_string(),
                },
            )
        })
    };
    Ok((parse(fields[0])?, parse(fields[1])?))
}
