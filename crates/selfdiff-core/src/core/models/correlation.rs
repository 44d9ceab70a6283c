/// Normalized mean-squared displacement, one value per lag `1..Tot`.
#[derive(Debug, Clone, PartialEq)]
pub struct MsdCurve {
    /// Time between two consecutive frames.
    pub timestep: f64,
    /// `values[d]` is the MSD at lag `d + 1`.
    pub values: Vec<f64>,
}

/// Normalized velocity autocorrelation, one value per lag `1..Tot`.
#[derive(Debug, Clone, PartialEq)]
pub struct VacCurve {
    pub timestep: f64,
    /// `values[d]` is the VAC at lag `d + 1`.
    pub values: Vec<f64>,
    /// Zero-lag self correlation of the reference frames, normalized like the lags.
    pub self_correlation: f64,
    /// Plain sum of `values` over every lag.
    pub integral: f64,
}

impl MsdCurve {
    /// Iterates over `(lag * timestep, value)` pairs in ascending lag order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        lag_times(self.timestep, self.values.len()).zip(self.values.iter().copied())
    }
}

impl VacCurve {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        lag_times(self.timestep, self.values.len()).zip(self.values.iter().copied())
    }
}

fn lag_times(timestep: f64, lags: usize) -> impl Iterator<Item = f64> {
    (1..=lags).map(move |lag| lag as f64 * timestep)
}
