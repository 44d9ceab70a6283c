//! Text result files for the correlation curves.
//!
//! MSD: one `<lag*dt> <msd>` line per lag. VAC: an `Integral <value>` line followed by one
//! `<lag*dt> <vac> <self correlation>` line per lag. Numbers use the shortest representation
//! that round-trips.

use super::traits::ResultFile;
use crate::core::models::correlation::{MsdCurve, VacCurve};
use std::io::{self, Write};

impl ResultFile for MsdCurve {
    type Error = io::Error;

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        for (time, value) in self.points() {
            writeln!(writer, "{} {}", time, value)?;
        }
        Ok(())
    }
}

impl ResultFile for VacCurve {
    type Error = io::Error;

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "Integral {}", self.integral)?;
        for (time, value) in self.points() {
            writeln!(writer, "{} {} {}", time, value, self.self_correlation)?;
        }
        Ok(())
    }
}
