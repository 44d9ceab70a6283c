use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::store::{FrameSource, StoreError};
use crate::core::models::correlation::{MsdCurve, VacCurve};
use crate::core::models::frame::Frame;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-pair contribution and per-lag normalization of a two-time correlation function.
pub trait PairKernel: Sync {
    /// Contribution of the frame pair `(reference, other)`, `other` being later in time.
    fn pair(&self, reference: &Frame, other: &Frame) -> f64;

    /// Zero-lag term accumulated once per reference frame.
    fn self_term(&self, _reference: &Frame) -> f64 {
        0.0
    }

    /// Divisor applied to a lag that was sampled by `pairs` frame pairs.
    fn normalizer(&self, pairs: usize, molecules: usize) -> f64;
}

/// `Σ_mol Σ_k (r_i - r_j)²`, normalized by the number of sampled coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquaredDisplacement;

impl PairKernel for MeanSquaredDisplacement {
    #[inline]
    fn pair(&self, reference: &Frame, other: &Frame) -> f64 {
        reference
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).norm_squared())
            .sum()
    }

    fn normalizer(&self, pairs: usize, molecules: usize) -> f64 {
        (pairs * molecules * 3) as f64
    }
}

/// `Σ_mol v_i · v_j`, with `Σ_mol |v_i|²` as the self term.
///
/// Normalized by half the number of sampled coordinates, for the lags and the self term alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityAutocorrelation;

impl PairKernel for VelocityAutocorrelation {
    #[inline]
    fn pair(&self, reference: &Frame, other: &Frame) -> f64 {
        reference
            .iter()
            .zip(other.iter())
            .map(|(a, b)| a.dot(b))
            .sum()
    }

    #[inline]
    fn self_term(&self, reference: &Frame) -> f64 {
        reference.iter().map(|v| v.norm_squared()).sum()
    }

    fn normalizer(&self, pairs: usize, molecules: usize) -> f64 {
        (pairs * molecules * 3) as f64 / 2.0
    }
}

/// Raw, unnormalized accumulator of one sweep or of one worker's share of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LagSums {
    /// `lags[d]` sums every pair at lag `d + 1`.
    pub lags: Vec<f64>,
    pub self_sum: f64,
}

impl LagSums {
    pub fn new(lags: usize) -> Self {
        Self {
            lags: vec![0.0; lags],
            self_sum: 0.0,
        }
    }

    pub fn merge(&mut self, other: &LagSums) {
        for (acc, value) in self.lags.iter_mut().zip(&other.lags) {
            *acc += value;
        }
        self.self_sum += other.self_sum;
    }
}

/// Normalized result of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub values: Vec<f64>,
    pub self_correlation: f64,
}

/// Sweeps every frame pair `(i, j)`, `i < j`, of a [`FrameSource`].
pub struct CorrelationEngine<'a> {
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> CorrelationEngine<'a> {
    pub fn new(reporter: &'a ProgressReporter<'a>) -> Self {
        Self { reporter }
    }

    #[instrument(skip_all, name = "correlation_sweep")]
    pub fn run<S, K>(&self, source: &mut S, kernel: &K) -> Result<Correlation, EngineError>
    where
        S: FrameSource,
        K: PairKernel,
    {
        let total = source.frame_count();
        if total < 2 {
            return Err(EngineError::NotEnoughFrames { found: total });
        }
        let molecules = source.molecule_count();
        info!(frames = total, molecules, "Starting pair sweep.");

        self.reporter.report(Progress::TaskStart {
            total_steps: (total - 1) as u64,
        });
        let sums = self.sweep(source, kernel)?;
        self.reporter.report(Progress::TaskFinish);

        Ok(normalize(&sums, kernel, total, molecules))
    }

    /// Mean-squared displacement of the centers held by `source`.
    pub fn msd<S: FrameSource>(&self, source: &mut S, timestep: f64) -> Result<MsdCurve, EngineError> {
        let correlation = self.run(source, &MeanSquaredDisplacement)?;
        Ok(MsdCurve {
            timestep,
            values: correlation.values,
        })
    }

    /// Velocity autocorrelation of the centers held by `source`. The integral is the plain sum
    /// of the normalized lags.
    pub fn vac<S: FrameSource>(&self, source: &mut S, timestep: f64) -> Result<VacCurve, EngineError> {
        let correlation = self.run(source, &VelocityAutocorrelation)?;
        let integral = correlation.values.iter().sum();
        Ok(VacCurve {
            timestep,
            values: correlation.values,
            self_correlation: correlation.self_correlation,
            integral,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn sweep<S, K>(&self, source: &mut S, kernel: &K) -> Result<LagSums, StoreError>
    where
        S: FrameSource,
        K: PairKernel,
    {
        let references = source.frame_count() - 1;
        sweep_references(source, kernel, 0..references, self.reporter)
    }

    #[cfg(feature = "parallel")]
    fn sweep<S, K>(&self, source: &mut S, kernel: &K) -> Result<LagSums, StoreError>
    where
        S: FrameSource,
        K: PairKernel,
    {
        let references = source.frame_count() - 1;
        let workers = rayon::current_num_threads().clamp(1, references);
        if workers == 1 {
            return sweep_references(source, kernel, 0..references, self.reporter);
        }
        tracing::debug!(workers, "Spreading reference frames over workers.");

        let handles = (0..workers)
            .map(|_| source.fork())
            .collect::<Result<Vec<S>, _>>()?;

        let partials: Vec<Result<LagSums, StoreError>> = handles
            .into_par_iter()
            .enumerate()
            .map(|(worker, mut handle)| {
                let outer = (worker..references).step_by(workers);
                sweep_references(&mut handle, kernel, outer, self.reporter)
            })
            .collect();

        let mut merged = LagSums::new(references);
        for partial in partials {
            merged.merge(&partial?);
        }
        Ok(merged)
    }
}

fn sweep_references<S, K>(
    source: &mut S,
    kernel: &K,
    outer: impl Iterator<Item = usize>,
    reporter: &ProgressReporter,
) -> Result<LagSums, StoreError>
where
    S: FrameSource,
    K: PairKernel,
{
    let total = source.frame_count();
    let mut sums = LagSums::new(total - 1);
    for i in outer {
        let reference = source.frame(i)?;
        sums.self_sum += kernel.self_term(&reference);
        for j in i + 1..total {
            let other = source.frame(j)?;
            sums.lags[j - i - 1] += kernel.pair(&reference, &other);
        }
        reporter.report(Progress::TaskIncrement);
    }
    Ok(sums)
}

fn normalize<K: PairKernel>(sums: &LagSums, kernel: &K, total: usize, molecules: usize) -> Correlation {
    let values = sums
        .lags
        .iter()
        .enumerate()
        .map(|(d, sum)| sum / kernel.normalizer(total - 1 - d, molecules))
        .collect();
    Correlation {
        values,
        self_correlation: sums.self_sum / kernel.normalizer(total - 1, molecules),
    }
}
