//! Minimum-image unwrapping of periodic coordinates.
//!
//! Unwrapping is done in two stages. The first frame is made whole molecule by molecule with
//! [`make_whole`], because atoms of one molecule may already sit on opposite sides of the box at
//! t=0. Every later frame goes through [`UnwrapState::advance`], which compares each atom with its
//! previous unwrapped position and shifts it by one box length whenever it moved more than half a
//! box along an axis.

use super::models::simulation_box::SimulationBox;
use nalgebra::Vector3;

/// Shifts `raw` by at most one box length per axis so that it lies within `cutoff` of
/// `reference`.
///
/// `reference` is the running reference of the molecule: the adjusted position of the previous
/// atom in file order.
pub fn make_whole(
    raw: &Vector3<f64>,
    reference: &Vector3<f64>,
    lengths: &Vector3<f64>,
    cutoff: &Vector3<f64>,
) -> Vector3<f64> {
    let mut position = *raw;
    for k in 0..3 {
        let dist = reference[k] - position[k];
        if dist > cutoff[k] {
            position[k] += lengths[k];
        } else if dist < -cutoff[k] {
            position[k] -= lengths[k];
        }
    }
    position
}

/// Box-derived quantities needed for one frame of temporal unwrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageShift {
    pub lengths: Vector3<f64>,
    pub half_lengths: Vector3<f64>,
}

impl From<&SimulationBox> for ImageShift {
    fn from(sim_box: &SimulationBox) -> Self {
        Self {
            lengths: sim_box.lengths(),
            half_lengths: sim_box.half_lengths(),
        }
    }
}

/// Per-atom state of one unwrap pass: the accumulated box-length correction and the last
/// unwrapped position of every atom.
#[derive(Debug, Clone, Default)]
pub struct UnwrapState {
    corrections: Vec<Vector3<f64>>,
    last: Vec<Vector3<f64>>,
}

impl UnwrapState {
    pub fn with_capacity(atoms: usize) -> Self {
        Self {
            corrections: Vec::with_capacity(atoms),
            last: Vec::with_capacity(atoms),
        }
    }

    /// Registers the next atom of the reference frame with its (already whole) position.
    pub fn seed(&mut self, position: Vector3<f64>) {
        self.corrections.push(Vector3::zeros());
        self.last.push(position);
    }

    /// Unwraps the raw position of `atom` in the next frame and records it as the atom's
    /// latest position.
    ///
    /// # Panics
    ///
    /// Panics if `atom` was never seeded.
    pub fn advance(&mut self, atom: usize, raw: &Vector3<f64>, shift: &ImageShift) -> Vector3<f64> {
        let correction = &mut self.corrections[atom];
        let last = &mut self.last[atom];

        for k in 0..3 {
            let mut position = raw[k] + correction[k];
            let dist = last[k] - position;
            if dist > shift.half_lengths[k] {
                correction[k] += shift.lengths[k];
                position += shift.lengths[k];
            } else if dist < -shift.half_lengths[k] {
                correction[k] -= shift.lengths[k];
                position -= shift.lengths[k];
            }
            last[k] = position;
        }
        *last
    }

    #[cfg(test)]
    fn correction(&self, atom: usize) -> Option<&Vector3<f64>> {
        self.corrections.get(atom)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.corrections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_box(length: f64) -> SimulationBox {
        SimulationBox::new(Vector3::zeros(), Vector3::repeat(length))
    }

    #[test]
    fn forward_crossing_unwraps_past_the_upper_bound() {
        let sim_box = cubic_box(10.0);
        let shift = ImageShift::from(&sim_box);
        let mut state = UnwrapState::with_capacity(1);
        state.seed(Vector3::new(9.0, 5.0, 5.0));

        let unwrapped = state.advance(0, &Vector3::new(0.5, 5.0, 5.0), &shift);

        assert!((unwrapped.x - 10.5).abs() < 1e-12);
        assert_eq!(state.correction(0), Some(&Vector3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn backward_crossing_unwraps_below_the_lower_bound() {
        let shift = ImageShift::from(&cubic_box(10.0));
        let mut state = UnwrapState::with_capacity(1);
        state.seed(Vector3::new(5.0, 0.5, 5.0));

        let unwrapped = state.advance(0, &Vector3::new(5.0, 9.5, 5.0), &shift);

        assert!((unwrapped.y + 0.5).abs() < 1e-12);
    }

    #[test]
    fn correction_persists_until_the_atom_crosses_back() {
        let shift = ImageShift::from(&cubic_box(10.0));
        let mut state = UnwrapState::with_capacity(1);
        state.seed(Vector3::new(9.0, 0.0, 0.0));

        state.advance(0, &Vector3::new(0.5, 0.0, 0.0), &shift);
        let second = state.advance(0, &Vector3::new(1.5, 0.0, 0.0), &shift);
        let third = state.advance(0, &Vector3::new(9.8, 0.0, 0.0), &shift);

        assert!((second.x - 11.5).abs() < 1e-12);
        assert!((third.x - 9.8).abs() < 1e-12);
        assert_eq!(state.correction(0), Some(&Vector3::zeros()));
    }

    #[test]
    fn small_moves_are_left_alone() {
        let shift = ImageShift::from(&cubic_box(10.0));
        let mut state = UnwrapState::with_capacity(1);
        state.seed(Vector3::new(4.0, 4.0, 4.0));

        let unwrapped = state.advance(0, &Vector3::new(6.0, 2.5, 4.1), &shift);

        assert_eq!(unwrapped, Vector3::new(6.0, 2.5, 4.1));
        assert_eq!(state.correction(0), Some(&Vector3::zeros()));
    }

    #[test]
    fn make_whole_pulls_atom_toward_reference() {
        let lengths = Vector3::repeat(10.0);
        let cutoff = Vector3::repeat(2.0);
        let reference = Vector3::new(9.5, 0.2, 5.0);

        let whole = make_whole(&Vector3::new(0.3, 9.9, 5.5), &reference, &lengths, &cutoff);

        assert!((whole.x - 10.3).abs() < 1e-12);
        assert!((whole.y + 0.1).abs() < 1e-12);
        assert_eq!(whole.z, 5.5);
    }

    #[test]
    fn unwrap_then_rewrap_reproduces_wrapped_two_atom_molecule() {
        let sim_box = cubic_box(10.0);
        let shift = ImageShift::from(&sim_box);
        let cutoff = Vector3::repeat(1.5);

        // Two atoms 1.0 apart, the second already folded across every face at t=0.
        let first_frame = [Vector3::new(9.6, 9.6, 9.6), Vector3::new(0.6, 0.6, 0.6)];
        // The molecule drifts by +0.8 per frame, crossing each face once more.
        let wrapped_frames: Vec<[Vector3<f64>; 2]> = (1..=3)
            .map(|t| {
                let drift = Vector3::repeat(0.8 * t as f64);
                [
                    sim_box.wrap(&(first_frame[0] + drift)),
                    sim_box.wrap(&(Vector3::new(10.6, 10.6, 10.6) + drift)),
                ]
            })
            .collect();

        let mut state = UnwrapState::with_capacity(2);
        let mut reference = first_frame[0];
        state.seed(reference);
        let whole = make_whole(&first_frame[1], &reference, &shift.lengths, &cutoff);
        reference = whole;
        state.seed(reference);
        assert!((whole - Vector3::new(10.6, 10.6, 10.6)).norm() < 1e-12);

        for frame in &wrapped_frames {
            for (atom, raw) in frame.iter().enumerate() {
                let unwrapped = state.advance(atom, raw, &shift);
                let rewrapped = sim_box.wrap(&unwrapped);
                assert!((rewrapped - raw).norm() < 1e-9);
            }
        }
        assert_eq!(state.len(), 2);
    }
}
