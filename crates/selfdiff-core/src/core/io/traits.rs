use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines how a computed correlation curve is serialized to a text result file.
pub trait ResultFile {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes the result to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Creates (or truncates) `path` and writes the result into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
