use super::{FrameSource, StoreError};
use crate::core::io::lammpstrj::{
    ColumnLayout, ColumnSet, FrameHeader, LammpstrjError, LineReader,
};
use crate::core::models::frame::Frame;
use crate::core::models::molecule::MoleculeSpec;
use crate::engine::config::FrameWindow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Start of a non-resident frame's atom block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameOffset {
    offset: u64,
    /// Number of lines before the block, to keep error line numbers exact after a seek.
    line: usize,
}

#[derive(Debug)]
struct Shared {
    path: PathBuf,
    layout: ColumnLayout,
    molecule: MoleculeSpec,
    index: Vec<FrameOffset>,
    resident: Vec<Arc<Frame>>,
}

/// Two-tier frame store over a LAMMPS text dump.
///
/// Window frames `[0, Tot - Mem)` are represented by the byte offset of their atom block and
/// decoded again on every access; frames `[Tot - Mem, Tot)` are decoded once during
/// [`LammpstrjStore::open`] and shared behind `Arc`. Both paths go through the same decoding
/// routine, so a frame has the same centers whichever tier it lives in.
#[derive(Debug)]
pub struct LammpstrjStore {
    shared: Arc<Shared>,
    reader: LineReader<BufReader<File>>,
}

impl LammpstrjStore {
    pub fn open(
        path: &Path,
        window: &FrameWindow,
        molecule: &MoleculeSpec,
        accepted: &[ColumnSet],
    ) -> Result<Self, StoreError> {
        let total = window.total();
        if total == 0 {
            return Err(StoreError::EmptyWindow);
        }

        let mut reader = open_reader(path)?;
        let atoms = molecule.total_atoms();
        let first_resident = window.first_resident();
        let required = window.start + total;

        let mut layout = None;
        let mut index = Vec::with_capacity(first_resident);
        let mut resident = Vec::with_capacity(total - first_resident);

        for frame in 0..required {
            if reader.is_at_end()? {
                return Err(StoreError::ShortTrajectory {
                    required,
                    found: frame,
                });
            }
            let header = FrameHeader::read(&mut reader, atoms)?;
            let active = adopt_layout(&mut layout, &header.columns, accepted, reader.line())?;
            if frame == window.start {
                debug!(timestep = header.timestep, "First frame of the window.");
            }

            if frame < window.start {
                reader.skip_lines(atoms, "atom records")?;
            } else if frame - window.start < first_resident {
                index.push(FrameOffset {
                    offset: reader.offset(),
                    line: reader.line(),
                });
                reader.skip_lines(atoms, "atom records")?;
            } else {
                resident.push(Arc::new(decode_frame(&mut reader, active, molecule)?));
            }
        }

        let layout = layout.ok_or(StoreError::EmptyWindow)?;
        info!(
            path = %path.display(),
            columns = %layout.set(),
            indexed = index.len(),
            resident = resident.len(),
            "Frame store ready."
        );

        Ok(Self {
            shared: Arc::new(Shared {
                path: path.to_path_buf(),
                layout,
                molecule: molecule.clone(),
                index,
                resident,
            }),
            reader,
        })
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.shared.layout
    }

    pub fn frame_count(&self) -> usize {
        self.shared.index.len() + self.shared.resident.len()
    }

    pub fn molecule_count(&self) -> usize {
        self.shared.molecule.molecules
    }

    /// Number of frames kept in memory.
    pub fn resident_count(&self) -> usize {
        self.shared.resident.len()
    }

    pub fn frame(&mut self, index: usize) -> Result<Arc<Frame>, StoreError> {
        let shared = &self.shared;
        let indexed = shared.index.len();
        if index >= indexed {
            return shared
                .resident
                .get(index - indexed)
                .cloned()
                .ok_or(StoreError::OutOfRange {
                    index,
                    total: indexed + shared.resident.len(),
                });
        }

        let entry = shared.index[index];
        self.reader.seek_to(entry.offset, entry.line)?;
        let frame = decode_frame(&mut self.reader, &shared.layout, &shared.molecule)?;
        Ok(Arc::new(frame))
    }

    /// Opens a new handle on the trajectory. Resident frames and the index are shared.
    pub fn fork(&self) -> Result<Self, StoreError> {
        debug!(path = %self.shared.path.display(), "Opening an additional trajectory handle.");
        Ok(Self {
            shared: Arc::clone(&self.shared),
            reader: open_reader(&self.shared.path)?,
        })
    }
}

impl FrameSource for LammpstrjStore {
    fn frame_count(&self) -> usize {
        LammpstrjStore::frame_count(self)
    }

    fn molecule_count(&self) -> usize {
        LammpstrjStore::molecule_count(self)
    }

    fn frame(&mut self, index: usize) -> Result<Arc<Frame>, StoreError> {
        LammpstrjStore::frame(self, index)
    }

    fn fork(&self) -> Result<Self, StoreError> {
        LammpstrjStore::fork(self)
    }
}

fn open_reader(path: &Path) -> Result<LineReader<BufReader<File>>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineReader::new(BufReader::new(file)))
}

/// Detects the layout on the first header and checks every later header against it.
fn adopt_layout<'a>(
    slot: &'a mut Option<ColumnLayout>,
    columns: &[String],
    accepted: &[ColumnSet],
    line: usize,
) -> Result<&'a ColumnLayout, LammpstrjError> {
    let layout = match slot.take() {
        Some(known) => {
            known
                .ensure_same(columns)
                .map_err(|kind| LammpstrjError::parse(line, kind))?;
            known
        }
        None => ColumnLayout::detect(columns, accepted)
            .map_err(|kind| LammpstrjError::parse(line, kind))?,
    };
    Ok(slot.insert(layout))
}

/// Reads one atom block and reduces it to one center per molecule.
fn decode_frame<R: BufRead>(
    reader: &mut LineReader<R>,
    layout: &ColumnLayout,
    molecule: &MoleculeSpec,
) -> Result<Frame, LammpstrjError> {
    let mut centers = Vec::with_capacity(molecule.molecules);
    for _ in 0..molecule.molecules {
        let mut com = molecule.reducer();
        for _ in 0..molecule.atoms_per_molecule {
            let (line_num, line) = reader.next_line("atom records")?;
            let vector = layout
                .decode_vector(line)
                .map_err(|kind| LammpstrjError::parse(line_num, kind))?;
            com.push(&vector);
        }
        centers.push(com.finish());
    }
    Ok(Frame::new(centers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::lammpstrj::{HEADER_LINES, ParseErrorKind};
    use nalgebra::Vector3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MOLECULES: usize = 2;
    const ATOMS: usize = 2;

    fn molecule() -> MoleculeSpec {
        MoleculeSpec::new(MOLECULES, ATOMS, vec![3.0, 1.0])
    }

    fn atom_position(frame: usize, atom: usize) -> [f64; 3] {
        let f = frame as f64;
        let a = atom as f64;
        [0.5 * f + a, 0.25 * f * a, 10.0 - f - 0.125 * a]
    }

    fn frame_text(frame: usize, columns: &str) -> String {
        let mut text = format!(
            "ITEM: TIMESTEP\n{}\nITEM: NUMBER OF ATOMS\n{}\nITEM: BOX BOUNDS pp pp pp\n\
             0 20\n0 20\n0 20\nITEM: ATOMS {columns}\n",
            frame * 100,
            MOLECULES * ATOMS
        );
        for atom in 0..MOLECULES * ATOMS {
            let [x, y, z] = atom_position(frame, atom);
            text.push_str(&format!("{} 1 {x} {y} {z}\n", atom + 1));
        }
        text
    }

    fn trajectory(frames: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for frame in 0..frames {
            file.write_all(frame_text(frame, "id type xu yu zu").as_bytes())
                .unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn expected_centers(frame: usize) -> Vec<Vector3<f64>> {
        let spec = molecule();
        (0..MOLECULES)
            .map(|m| {
                let atoms: Vec<_> = (0..ATOMS)
                    .map(|a| Vector3::from(atom_position(frame, m * ATOMS + a)))
                    .collect();
                spec.center_of_mass(&atoms)
            })
            .collect()
    }

    fn open(file: &NamedTempFile, window: FrameWindow) -> Result<LammpstrjStore, StoreError> {
        LammpstrjStore::open(file.path(), &window, &molecule(), ColumnSet::POSITIONS)
    }

    #[test]
    fn every_resident_split_yields_identical_frames() {
        let file = trajectory(5);
        let reference: Vec<Arc<Frame>> = {
            let mut store = open(&file, FrameWindow::new(0, 5, 5)).unwrap();
            (0..5).map(|i| store.frame(i).unwrap()).collect()
        };

        for mem in 0..=5 {
            let mut store = open(&file, FrameWindow::new(0, 5, mem)).unwrap();
            assert_eq!(store.resident_count(), mem);
            for (i, expected) in reference.iter().enumerate() {
                assert_eq!(store.frame(i).unwrap().as_ref(), expected.as_ref(), "mem={mem} frame={i}");
            }
        }
    }

    #[test]
    fn frames_are_mass_weighted_centers() {
        let file = trajectory(3);
        let mut store = open(&file, FrameWindow::new(0, 3, 1)).unwrap();
        for i in 0..3 {
            let frame = store.frame(i).unwrap();
            for (got, want) in frame.iter().zip(expected_centers(i)) {
                assert!((got - want).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn leading_frames_are_skipped() {
        let file = trajectory(6);
        let mut store = open(&file, FrameWindow::new(2, 5, 1)).unwrap();
        assert_eq!(store.frame_count(), 3);
        let first = store.frame(0).unwrap();
        for (got, want) in first.iter().zip(expected_centers(2)) {
            assert!((got - want).norm() < 1e-12);
        }
        let last = store.frame(2).unwrap();
        for (got, want) in last.iter().zip(expected_centers(4)) {
            assert!((got - want).norm() < 1e-12);
        }
    }

    #[test]
    fn indexed_frames_can_be_read_in_any_order() {
        let file = trajectory(4);
        let mut store = open(&file, FrameWindow::new(0, 4, 0)).unwrap();
        let late = store.frame(3).unwrap();
        let early = store.frame(0).unwrap();
        let again = store.frame(3).unwrap();
        assert_eq!(late, again);
        assert_ne!(late, early);
    }

    #[test]
    fn forks_read_independently() {
        let file = trajectory(4);
        let mut store = open(&file, FrameWindow::new(0, 4, 1)).unwrap();
        let mut fork = store.fork().unwrap();
        let a = fork.frame(1).unwrap();
        let b = store.frame(2).unwrap();
        assert_eq!(fork.frame(2).unwrap(), b);
        assert_eq!(store.frame(1).unwrap(), a);
        assert!(Arc::ptr_eq(&store.frame(3).unwrap(), &fork.frame(3).unwrap()));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let file = trajectory(3);
        let mut store = open(&file, FrameWindow::new(0, 3, 1)).unwrap();
        assert!(matches!(
            store.frame(3),
            Err(StoreError::OutOfRange { index: 3, total: 3 })
        ));
    }

    #[test]
    fn short_trajectory_is_reported() {
        let file = trajectory(3);
        let err = open(&file, FrameWindow::new(1, 5, 0)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ShortTrajectory {
                required: 5,
                found: 3
            }
        ));
    }

    #[test]
    fn velocity_columns_are_rejected_for_positions() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(frame_text(0, "id type vx vy vz").as_bytes()).unwrap();
        file.write_all(frame_text(1, "id type vx vy vz").as_bytes()).unwrap();
        file.flush().unwrap();

        let err = open(&file, FrameWindow::new(0, 2, 2)).unwrap_err();
        match err {
            StoreError::Format(LammpstrjError::Parse { line, kind }) => {
                assert_eq!(line, HEADER_LINES);
                assert!(matches!(kind, ParseErrorKind::MissingColumns { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn layout_change_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(frame_text(0, "id type xu yu zu").as_bytes()).unwrap();
        file.write_all(frame_text(1, "id mol xu yu zu").as_bytes()).unwrap();
        file.flush().unwrap();

        let err = open(&file, FrameWindow::new(0, 2, 0)).unwrap_err();
        match err {
            StoreError::Format(LammpstrjError::Parse { line, kind }) => {
                assert_eq!(line, 2 * HEADER_LINES + MOLECULES * ATOMS);
                assert!(matches!(kind, ParseErrorKind::LayoutChanged { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparsable_coordinate_reports_its_line_on_reread() {
        let mut file = NamedTempFile::new().unwrap();
        let broken = frame_text(0, "id type xu yu zu").replacen("1 1 0 0 10", "1 1 abc 0 10", 1);
        file.write_all(broken.as_bytes()).unwrap();
        file.write_all(frame_text(1, "id type xu yu zu").as_bytes()).unwrap();
        file.flush().unwrap();

        let mut store = open(&file, FrameWindow::new(0, 2, 1)).unwrap();
        match store.frame(0).unwrap_err() {
            StoreError::Format(LammpstrjError::Parse { line, kind }) => {
                assert_eq!(line, HEADER_LINES + 1);
                assert!(matches!(kind, ParseErrorKind::InvalidFloat { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.lammpstrj");
        let err =
            LammpstrjStore::open(&path, &FrameWindow::new(0, 2, 0), &molecule(), ColumnSet::POSITIONS)
                .unwrap_err();
        assert!(matches!(err, StoreError::Open { path: p, .. } if p == path));
    }
}
