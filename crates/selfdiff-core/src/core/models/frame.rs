use nalgebra::Vector3;
use std::ops::Index;

/// One trajectory snapshot reduced to one vector per molecule.
///
/// Depending on the columns it was read from, each entry is either a mass-weighted center of
/// mass position or a mass-weighted center of mass velocity. A frame is immutable once built;
/// the frame store hands it out behind an `Arc` so resident frames are never copied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    centers: Vec<Vector3<f64>>,
}

impl Frame {
    pub fn new(centers: Vec<Vector3<f64>>) -> Self {
        Self { centers }
    }

    /// Number of molecules in the frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    #[inline]
    pub fn centers(&self) -> &[Vector3<f64>] {
        &self.centers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.centers.iter()
    }
}

impl Index<usize> for Frame {
    type Output = Vector3<f64>;

    fn index(&self, molecule: usize) -> &Self::Output {
        &self.centers[molecule]
    }
}

impl From<Vec<Vector3<f64>>> for Frame {
    fn from(centers: Vec<Vector3<f64>>) -> Self {
        Self::new(centers)
    }
}
