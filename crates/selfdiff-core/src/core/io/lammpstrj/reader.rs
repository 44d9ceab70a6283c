use super::LammpstrjError;
use std::io::{self, BufRead, Seek, SeekFrom};

/// Line-oriented reader that keeps track of the 1-based line number and of the byte offset of
/// the next unread line.
///
/// Each call to [`LineReader::next_line`] returns a view into an internal buffer that the next
/// call overwrites; the borrow checker guarantees the caller is done with a line before the next
/// one is read.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: String,
    line: usize,
    offset: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            line: 0,
            offset: 0,
        }
    }

    /// Number of lines consumed so far (the 1-based number of the last line read).
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Byte offset of the next unread line.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads the next line without its line terminator and returns it with its 1-based line
    /// number. `step` names what was being read and ends up in the error if the file stops early.
    pub fn next_line(&mut self, step: &'static str) -> Result<(usize, &str), LammpstrjError> {
        self.buf.clear();
        let read = self.inner.read_line(&mut self.buf)?;
        if read == 0 {
            return Err(LammpstrjError::UnexpectedEof {
                line: self.line,
                step,
            });
        }
        self.line += 1;
        self.offset += read as u64;
        Ok((self.line, self.buf.trim_end_matches(['\n', '\r'])))
    }

    /// Skips `count` lines, failing on a premature end of file.
    pub fn skip_lines(&mut self, count: usize, step: &'static str) -> Result<(), LammpstrjError> {
        for _ in 0..count {
            self.next_line(step)?;
        }
        Ok(())
    }

    /// Returns `true` once every byte of the input has been consumed.
    pub fn is_at_end(&mut self) -> io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }
}

impl<R: BufRead + Seek> LineReader<R> {
    /// Moves the cursor to `offset`, which must be the start of line number `line + 1`.
    pub fn seek_to(&mut self, offset: u64, line: usize) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        self.line = line;
        Ok(())
    }
}
