//! Minimum detectable effect and its confidence interval.

use super::critical::{critical_values, TestParameters};
use super::check_domain;
use crate::distribution::{StatrsT, TDistribution};
use crate::error::{PowerError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Minimum detectable effect with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdeResult {
    /// Smallest standardized effect detectable at the requested power.
    pub minimum_detectable_effect: f64,
    /// Confidence interval (lower, upper) around the effect.
    pub confidence_interval: (f64, f64),
    /// Confidence level in whole percent.
    pub confidence_percent: u32,
}

impl MdeResult {
    /// Lower bound of the confidence interval.
    pub fn lower(&self) -> f64 {
        self.confidence_interval.0
    }

    /// Upper bound of the confidence interval.
    pub fn upper(&self) -> f64 {
        self.confidence_interval.1
    }

    /// Key under which the interval is reported, e.g. "95% Confidence Interval".
    pub fn interval_label(&self) -> String {
        format!("{}% Confidence Interval", self.confidence_percent)
    }
}

impl Serialize for MdeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("minimum_detectable_effect", &self.minimum_detectable_effect)?;
        map.serialize_entry(
            &self.interval_label(),
            &[self.confidence_interval.0, self.confidence_interval.1],
        )?;
        map.end()
    }
}

/// Minimum detectable effect for a test with standardized standard error
/// `sse` and `df` degrees of freedom.
///
/// The interval is anchored at the effect and scaled by the ratio of the
/// rejection critical value to the combined critical value:
/// `mde * (1 -/+ t1 / M)`.
///
/// # Errors
/// Domain error if `sse < 0` or `df < 1`.
pub fn mde(power: f64, alpha: f64, sse: f64, df: f64, two_tailed: bool) -> Result<MdeResult> {
    mde_with(&StatrsT, power, alpha, sse, df, two_tailed)
}

/// [`mde`] with an explicit distribution provider.
pub fn mde_with<D: TDistribution>(
    dist: &D,
    power: f64,
    alpha: f64,
    sse: f64,
    df: f64,
    two_tailed: bool,
) -> Result<MdeResult> {
    check_domain(sse, df)?;
    let test = TestParameters::new(alpha, two_tailed);
    let cv = critical_values(dist, test, power, df)?;

    if cv.multiplier == 0.0 {
        return Err(PowerError::Numerical(format!(
            "combined critical value is zero at power = {}, alpha = {}, df = {}",
            power, alpha, df
        )));
    }

    let effect = cv.multiplier * sse;
    let ratio = cv.t1 / cv.multiplier;

    Ok(MdeResult {
        minimum_detectable_effect: effect,
        confidence_interval: (effect * (1.0 - ratio), effect * (1.0 + ratio)),
        confidence_percent: test.confidence_percent(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mde_reference_value() {
        let result = mde(0.8, 0.05, 0.051, 210.0, true).unwrap();
        assert_abs_diff_eq!(result.minimum_detectable_effect, 0.1436, epsilon = 1e-3);
        assert!(result.lower() < result.minimum_detectable_effect);
        assert!(result.upper() > result.minimum_detectable_effect);
    }

    #[test]
    fn test_interval_half_width_is_t1_sse() {
        let sse = 0.08;
        let result = mde(0.8, 0.05, sse, 30.0, true).unwrap();
        let t1 = StatrsT.quantile(0.975, 30.0).unwrap();
        let half = (result.upper() - result.lower()) / 2.0;
        assert_abs_diff_eq!(half, t1 * sse, epsilon = 1e-9);
    }

    #[test]
    fn test_mde_domain_errors() {
        assert!(matches!(mde(0.8, 0.05, -0.01, 20.0, true), Err(PowerError::Domain(_))));
        assert!(matches!(mde(0.8, 0.05, 0.05, 0.0, true), Err(PowerError::Domain(_))));
        assert!(matches!(mde(0.8, 0.05, 0.05, 0.5, true), Err(PowerError::Domain(_))));
    }

    #[test]
    fn test_mde_zero_sse() {
        let result = mde(0.8, 0.05, 0.0, 20.0, true).unwrap();
        assert_eq!(result.minimum_detectable_effect, 0.0);
        assert_eq!(result.confidence_interval, (0.0, 0.0));
    }

    #[test]
    fn test_mde_serializes_with_interval_label() {
        let result = mde(0.8, 0.10, 0.1, 40.0, true).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert!(json.get("minimum_detectable_effect").is_some());
        let interval = json.get("90% Confidence Interval").unwrap().as_array().unwrap();
        assert_eq!(interval.len(), 2);
    }
}
