use super::ParseErrorKind;
use nalgebra::Vector3;
use std::fmt;

/// A named triple of per-atom columns that can feed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnSet {
    /// Wrapped positions `x y z`, folded into the periodic box.
    Wrapped,
    /// Unwrapped positions `xu yu zu`.
    Unwrapped,
    /// Velocities `vx vy vz`.
    Velocity,
}

impl ColumnSet {
    /// Sets that describe positions, in order of preference.
    pub const POSITIONS: &'static [ColumnSet] = &[ColumnSet::Unwrapped, ColumnSet::Wrapped];

    pub const fn labels(self) -> [&'static str; 3] {
        match self {
            ColumnSet::Wrapped => ["x", "y", "z"],
            ColumnSet::Unwrapped => ["xu", "yu", "zu"],
            ColumnSet::Velocity => ["vx", "vy", "vz"],
        }
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.labels().join(","))
    }
}

/// One decoded atom record: every token of the line plus the parsed coordinate triple.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub tokens: Vec<String>,
    pub vector: Vector3<f64>,
}

/// Position of the three coordinate columns inside an atom record, together with the full list
/// of column labels from the `ITEM: ATOMS` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    set: ColumnSet,
    indices: [usize; 3],
    labels: Vec<String>,
}

impl ColumnLayout {
    /// Finds the coordinate columns among the labels of an `ITEM: ATOMS` line.
    ///
    /// `accepted` is tried in order and the first set whose three labels are all present wins.
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::NotEnoughColumns`] when `labels` is empty and
    /// [`ParseErrorKind::MissingColumns`] when no accepted set is complete.
    pub fn detect<S: AsRef<str>>(
        labels: &[S],
        accepted: &[ColumnSet],
    ) -> Result<Self, ParseErrorKind> {
        if labels.is_empty() {
            return Err(ParseErrorKind::NotEnoughColumns);
        }

        for &set in accepted {
            let mut indices = [0usize; 3];
            let mut found = 0;
            for (k, wanted) in set.labels().iter().enumerate() {
                if let Some(pos) = labels.iter().position(|l| l.as_ref() == *wanted) {
                    indices[k] = pos;
                    found += 1;
                }
            }
            if found == 3 {
                return Ok(Self {
                    set,
                    indices,
                    labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
                });
            }
        }

        Err(ParseErrorKind::MissingColumns {
            expected: accepted
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
        })
    }

    #[inline]
    pub fn set(&self) -> ColumnSet {
        self.set
    }

    /// Token positions of the three coordinate columns.
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }

    /// Number of tokens every atom record must have.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Checks that a later `ITEM: ATOMS` line carries exactly the same labels.
    pub fn ensure_same<S: AsRef<str>>(&self, labels: &[S]) -> Result<(), ParseErrorKind> {
        let same = labels.len() == self.labels.len()
            && labels
                .iter()
                .zip(&self.labels)
                .all(|(a, b)| a.as_ref() == b.as_str());
        if same {
            Ok(())
        } else {
            Err(ParseErrorKind::LayoutChanged {
                expected: self.labels.join(" "),
                found: labels
                    .iter()
                    .map(|l| l.as_ref())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
        }
    }

    /// Parses only the coordinate triple of an atom record.
    pub fn decode_vector(&self, line: &str) -> Result<Vector3<f64>, ParseErrorKind> {
        let mut raw = [""; 3];
        let mut count = 0;
        for (pos, token) in line.split_whitespace().enumerate() {
            for k in 0..3 {
                if self.indices[k] == pos {
                    raw[k] = token;
                }
            }
            count += 1;
        }
        self.check_count(count)?;
        self.parse_triple(&raw)
    }

    /// Parses an atom record, keeping every token for re-serialization.
    pub fn decode(&self, line: &str) -> Result<AtomRecord, ParseErrorKind> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        self.check_count(tokens.len())?;
        let raw = self.indices.map(|i| tokens[i].as_str());
        let vector = self.parse_triple(&raw)?;
        Ok(AtomRecord { tokens, vector })
    }

    /// Re-serializes `record` with the coordinate columns replaced by `vector`. Every other
    /// token is written verbatim.
    pub fn encode(&self, record: &AtomRecord, vector: &Vector3<f64>) -> String {
        let mut line = String::with_capacity(record.tokens.iter().map(|t| t.len() + 1).sum());
        for (pos, token) in record.tokens.iter().enumerate() {
            if pos > 0 {
                line.push(' ');
            }
            match self.indices.iter().position(|&i| i == pos) {
                Some(k) => line.push_str(&vector[k].to_string()),
                None => line.push_str(token),
            }
        }
        line
    }

    /// The `ITEM: ATOMS` line with wrapped coordinate labels renamed to their unwrapped form.
    pub fn unwrapped_header(&self) -> String {
        let wrapped = ColumnSet::Wrapped.labels();
        let unwrapped = ColumnSet::Unwrapped.labels();
        let labels: Vec<&str> = self
            .labels
            .iter()
            .map(|label| {
                wrapped
                    .iter()
                    .position(|w| w == label)
                    .map_or(label.as_str(), |k| unwrapped[k])
            })
            .collect();
        format!("ITEM: ATOMS {}", labels.join(" "))
    }

    fn check_count(&self, found: usize) -> Result<(), ParseErrorKind> {
        if found != self.labels.len() {
            return Err(ParseErrorKind::ColumnCountMismatch {
                expected: self.labels.len(),
                found,
            });
        }
        Ok(())
    }

    fn parse_triple(&self, raw: &[&str; 3]) -> Result<Vector3<f64>, ParseErrorKind> {
        let mut vector = Vector3::zeros();
        for k in 0..3 {
            vector[k] = raw[k]
                .parse()
                .map_err(|_| ParseErrorKind::InvalidFloat {
                    column: self.labels[self.indices[k]].clone(),
                    value: raw[k].to_string(),
                })?;
        }
        Ok(vector)
    }
}
