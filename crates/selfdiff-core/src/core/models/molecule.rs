use nalgebra::Vector3;

/// Shape of every molecule in the trajectory: how many there are, how many atoms each one has,
/// and the mass of each atom by its index inside the molecule.
///
/// The same mass table applies to every molecule of every frame. Atom records in the trajectory
/// are expected molecule by molecule, `atoms_per_molecule` consecutive records per molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeSpec {
    pub molecules: usize,
    pub atoms_per_molecule: usize,
    pub masses: Vec<f64>,
}

impl MoleculeSpec {
    pub fn new(molecules: usize, atoms_per_molecule: usize, masses: Vec<f64>) -> Self {
        Self {
            molecules,
            atoms_per_molecule,
            masses,
        }
    }

    /// Number of atom records in one frame.
    #[inline]
    pub fn total_atoms(&self) -> usize {
        self.molecules * self.atoms_per_molecule
    }

    /// Starts a mass-weighted reduction for one molecule.
    #[inline]
    pub fn reducer(&self) -> CenterOfMass<'_> {
        CenterOfMass {
            masses: &self.masses,
            weighted: Vector3::zeros(),
            total_mass: 0.0,
            next_atom: 0,
        }
    }

    /// Mass-weighted average of one molecule's atom vectors, given in file order.
    pub fn center_of_mass(&self, atoms: &[Vector3<f64>]) -> Vector3<f64> {
        let mut reducer = self.reducer();
        for atom in atoms {
            reducer.push(atom);
        }
        reducer.finish()
    }
}

/// Running center-of-mass sum for a single molecule.
///
/// Every frame, resident or re-read from disk, goes through this accumulator, so the two
/// paths sum in the same order and produce identical results.
#[derive(Debug, Clone)]
pub struct CenterOfMass<'a> {
    masses: &'a [f64],
    weighted: Vector3<f64>,
    total_mass: f64,
    next_atom: usize,
}

impl CenterOfMass<'_> {
    /// Adds the next atom of the molecule. Atoms beyond the mass table are a bug: debug builds
    /// panic, release builds ignore them.
    #[inline]
    pub fn push(&mut self, atom: &Vector3<f64>) {
        debug_assert!(
            self.next_atom < self.masses.len(),
            "molecule has more atoms than masses ({})",
            self.masses.len()
        );
        let Some(&mass) = self.masses.get(self.next_atom) else {
            return;
        };
        for k in 0..3 {
            self.weighted[k] += atom[k] * mass;
        }
        self.total_mass += mass;
        self.next_atom += 1;
    }

    #[inline]
    pub fn finish(self) -> Vector3<f64> {
        self.weighted / self.total_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_atoms_is_molecules_times_atoms() {
        let spec = MoleculeSpec::new(4, 3, vec![16.0, 1.0, 1.0]);
        assert_eq!(spec.total_atoms(), 12);
    }

    #[test]
    fn center_of_mass_weights_by_mass() {
        let spec = MoleculeSpec::new(1, 2, vec![3.0, 1.0]);
        let com = spec.center_of_mass(&[Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 8.0, -4.0)]);
        assert!((com - Vector3::new(1.0, 2.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn single_atom_molecule_is_its_own_center() {
        let spec = MoleculeSpec::new(1, 1, vec![12.011]);
        let atom = Vector3::new(1.5, -2.5, 3.25);
        assert_eq!(spec.center_of_mass(&[atom]), atom);
    }

    #[test]
    fn reducer_and_slice_paths_agree_bit_for_bit() {
        let spec = MoleculeSpec::new(1, 3, vec![15.999, 1.008, 1.008]);
        let atoms = [
            Vector3::new(0.1, 0.2, 0.3),
            Vector3::new(0.7, -0.2, 0.35),
            Vector3::new(-0.3, 0.9, 0.1),
        ];
        let mut reducer = spec.reducer();
        atoms.iter().for_each(|a| reducer.push(a));
        assert_eq!(reducer.finish(), spec.center_of_mass(&atoms));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "more atoms than masses")]
    fn pushing_past_the_mass_table_panics_in_debug_builds() {
        let spec = MoleculeSpec::new(1, 1, vec![1.0]);
        let mut reducer = spec.reducer();
        reducer.push(&Vector3::zeros());
        reducer.push(&Vector3::zeros());
    }
}
