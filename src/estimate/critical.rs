//! Critical t-values shared by the effect estimator and the sample size solver.

use crate::distribution::TDistribution;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Significance settings of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    /// Probability of a Type I error.
    pub alpha: f64,
    /// Whether the test is two-tailed.
    #[serde(default = "default_two_tailed")]
    pub two_tailed: bool,
}

fn default_two_tailed() -> bool {
    true
}

impl Default for TestParameters {
    fn default() -> Self {
        Self {
            alpha: 0.10,
            two_tailed: true,
        }
    }
}

impl TestParameters {
    /// Create test parameters.
    pub fn new(alpha: f64, two_tailed: bool) -> Self {
        Self { alpha, two_tailed }
    }

    /// Tail probability that defines the rejection boundary.
    pub fn rejection_tail(&self) -> f64 {
        if self.two_tailed {
            self.alpha / 2.0
        } else {
            self.alpha
        }
    }

    /// Confidence level in whole percent, e.g. 95 for alpha = 0.05.
    pub fn confidence_percent(&self) -> u32 {
        ((1.0 - self.alpha) * 100.0).round() as u32
    }
}

/// Critical t-values for a target power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// Rejection-boundary critical value |t(alpha or alpha/2, df)|.
    pub t1: f64,
    /// Critical value for the target power |t(power, df)|.
    pub t2: f64,
    /// Total noncentrality needed to reach the target power.
    pub multiplier: f64,
}

/// Compute the critical values for a test at `power` with `df` degrees of
/// freedom.
///
/// Below 50% power the two critical regions overlap, so `t2` is subtracted
/// instead of added.
pub fn critical_values<D: TDistribution>(
    dist: &D,
    test: TestParameters,
    power: f64,
    df: f64,
) -> Result<CriticalValues> {
    let t1 = dist.quantile(test.rejection_tail(), df)?.abs();
    let t2 = dist.quantile(power, df)?.abs();
    let multiplier = if power >= 0.5 { t1 + t2 } else { t1 - t2 };

    Ok(CriticalValues { t1, t2, multiplier })
}
