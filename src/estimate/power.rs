//! Statistical power from the noncentral t-distribution.

use super::critical::TestParameters;
use super::check_domain;
use crate::distribution::{StatrsT, TDistribution};
use crate::error::Result;

/// Power of a test to detect `effect_size` given standardized standard error
/// `sse` and `df` degrees of freedom.
///
/// Power is the probability that the noncentral test statistic, with
/// noncentrality `effect_size / sse`, falls in the rejection region of the
/// null distribution. The value is not clamped to [0, 1].
///
/// # Errors
/// Domain error if `sse < 0` or `df < 1`.
pub fn power(effect_size: f64, alpha: f64, sse: f64, df: f64, two_tailed: bool) -> Result<f64> {
    power_with(&StatrsT, effect_size, alpha, sse, df, two_tailed)
}

/// [`power`] with an explicit distribution provider.
pub fn power_with<D: TDistribution>(
    dist: &D,
    effect_size: f64,
    alpha: f64,
    sse: f64,
    df: f64,
    two_tailed: bool,
) -> Result<f64> {
    check_domain(sse, df)?;
    let test = TestParameters::new(alpha, two_tailed);
    let lambda = effect_size / sse;
    let critical = dist.isf(test.rejection_tail(), df)?;

    let upper = 1.0 - dist.noncentral_cdf(critical, df, lambda)?;
    if two_tailed {
        Ok(upper + dist.noncentral_cdf(-critical, df, lambda)?)
    } else {
        Ok(upper)
    }
}
