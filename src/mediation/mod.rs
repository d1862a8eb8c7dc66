//! Power of tests for indirect (mediated) effects.

pub mod paths;

pub use paths::{
    se_a211, se_a221, se_a321, se_b1211, se_b211, se_b221, se_b321, MediationParams,
};

use crate::error::Result;
use crate::estimate::{power, TestParameters};

/// Degrees of freedom used for the Sobel test's normal reference.
pub const SOBEL_DF: f64 = 1e8;

/// First-order (delta method) standard error of the indirect effect `a * b`,
/// `sqrt(b^2 se_a^2 + a^2 se_b^2)`.
///
/// PowerUp's Sobel helper instead uses `sqrt(a^2 + b^2 + se_a^2 + se_b^2)`,
/// so Sobel powers ported from PowerUp will not match.
pub fn se_sobel(a: f64, b: f64, se_a: f64, se_b: f64) -> f64 {
    (b.powi(2) * se_a.powi(2) + a.powi(2) * se_b.powi(2)).sqrt()
}

/// Power of the Sobel test for the indirect effect `a * b`.
///
/// Pass [`SOBEL_DF`] for the usual large-sample test.
pub fn power_sobel(
    a: f64,
    b: f64,
    se_a: f64,
    se_b: f64,
    test: TestParameters,
    df: f64,
) -> Result<f64> {
    power(a * b, test.alpha, se_sobel(a, b, se_a, se_b), df, test.two_tailed)
}

/// Power of the joint significance test: both paths must be significant.
pub fn power_joint(
    (a, se_a, df_a): (f64, f64, f64),
    (b, se_b, df_b): (f64, f64, f64),
    test: TestParameters,
) -> Result<f64> {
    let power_a = power(a, test.alpha, se_a, df_a, test.two_tailed)?;
    let power_b = power(b, test.alpha, se_b, df_b, test.two_tailed)?;
    Ok(power_a * power_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_se_sobel() {
        // sqrt(0.4^2 * 0.1^2 + 0.3^2 * 0.2^2) = sqrt(0.0016 + 0.0036)
        assert_abs_diff_eq!(se_sobel(0.3, 0.4, 0.1, 0.2), 0.0052_f64.sqrt(), epsilon = 1e-12);
        // Not PowerUp's sqrt(a^2 + b^2 + se_a^2 + se_b^2) = sqrt(0.30)
        assert!(se_sobel(0.3, 0.4, 0.1, 0.2) < 0.1);
    }

    #[test]
    fn test_sobel_power_grows_with_paths() {
        let test = TestParameters::new(0.05, true);
        let weak = power_sobel(0.2, 0.2, 0.05, 0.05, test, SOBEL_DF).unwrap();
        let strong = power_sobel(0.4, 0.4, 0.05, 0.05, test, SOBEL_DF).unwrap();
        assert!(weak > 0.05 && weak < 1.0);
        assert!(strong > weak);
    }

    #[test]
    fn test_joint_is_product() {
        let test = TestParameters::new(0.05, true);
        let pa = power(0.3, 0.05, 0.1, 40.0, true).unwrap();
        let pb = power(0.25, 0.05, 0.1, 60.0, true).unwrap();
        let joint = power_joint((0.3, 0.1, 40.0), (0.25, 0.1, 60.0), test).unwrap();
        assert_abs_diff_eq!(joint, pa * pb, epsilon = 1e-12);
        assert!(joint <= pa.min(pb));
    }
}
