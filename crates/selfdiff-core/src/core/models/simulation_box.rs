use nalgebra::Vector3;

/// Orthorhombic periodic box read from the `ITEM: BOX BOUNDS` block of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    pub lo: Vector3<f64>,
    pub hi: Vector3<f64>,
}

impl SimulationBox {
    pub fn new(lo: Vector3<f64>, hi: Vector3<f64>) -> Self {
        Self { lo, hi }
    }

    /// Edge lengths `hi - lo` along each axis.
    #[inline]
    pub fn lengths(&self) -> Vector3<f64> {
        self.hi - self.lo
    }

    /// Half edge lengths, the minimum-image threshold.
    #[inline]
    pub fn half_lengths(&self) -> Vector3<f64> {
        self.lengths() / 2.
    }

    /// Folds a position back into `[lo, hi)` along every axis.
    pub fn wrap(&self, position: &Vector3<f64>) -> Vector3<f64> {
        let lengths = self.lengths();
        Vector3::from_fn(|k, _| {
            let shifted = (position[k] - self.lo[k]).rem_euclid(lengths[k]);
            self.lo[k] + shifted
        })
    }
}
