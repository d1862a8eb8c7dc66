//! Standard errors of mediation path coefficients in multilevel designs.
//!
//! Design labels give the levels of treatment, mediator and outcome, e.g.
//! 2-2-1 is a level 2 treatment and mediator with a level 1 outcome. Path
//! `a` runs from treatment to mediator, path `b` from mediator to outcome.

use crate::error::{PowerError, Result};
use serde::{Deserialize, Serialize};

/// Parameters shared by the mediation path formulas.
///
/// The defaults only fill in what is commonly zero. Callers must set the unit
/// counts `n`, `J` (and `K` for 3-2-1 designs) and the mediator ICC `rhom2`
/// (and `rhom3`): with the defaults `se_a211` and `se_b211` divide zero by
/// zero and `se_a321` gets a negative denominator, all of which are reported
/// as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediationParams {
    /// Standardized treatment-mediator path.
    pub esa: f64,
    /// Standardized mediator-outcome path (level 2 mediator).
    pub esb: f64,
    /// Standardized between-cluster mediator-outcome path.
    #[serde(rename = "esB")]
    pub es_b_between: f64,
    /// Standardized within-cluster mediator-outcome path.
    pub esb1: f64,
    /// Standardized direct effect.
    pub escp: f64,

    /// Outcome intraclass correlations.
    pub rho2: f64,
    pub rho3: f64,
    /// Mediator intraclass correlations.
    pub rhom2: f64,
    pub rhom3: f64,

    /// Outcome variance explained by covariates at levels 1-3.
    pub r21: f64,
    pub r22: f64,
    pub r23: f64,
    /// Mediator variance explained by covariates at levels 1-3.
    pub r2m1: f64,
    pub r2m2: f64,
    pub r2m3: f64,

    /// Proportion of units assigned to treatment.
    pub p: f64,
    /// Level 1 units per level 2 unit.
    pub n: f64,
    /// Level 2 units (per level 3 unit in three-level designs).
    #[serde(rename = "J", alias = "j")]
    pub j: f64,
    /// Level 3 units.
    #[serde(rename = "K", alias = "k")]
    pub k: f64,
}

impl Default for MediationParams {
    fn default() -> Self {
        Self {
            esa: 0.0,
            esb: 0.0,
            es_b_between: 0.0,
            esb1: 0.0,
            escp: 0.0,
            rho2: 0.0,
            rho3: 0.0,
            rhom2: 0.0,
            rhom3: 0.0,
            r21: 0.0,
            r22: 0.0,
            r23: 0.0,
            r2m1: 0.0,
            r2m2: 0.0,
            r2m3: 0.0,
            p: 0.5,
            n: 1.0,
            j: 1.0,
            k: 1.0,
        }
    }
}

impl MediationParams {
    fn pq(&self) -> f64 {
        self.p * (1.0 - self.p)
    }

    /// Level 2 mediator variance left after treatment.
    fn tau2_mediator(&self) -> f64 {
        self.rhom2 * (1.0 - self.r2m2 - self.pq() * self.esa.powi(2) / self.rhom2)
    }

    /// Level 1 mediator variance left after covariates.
    fn sigma2_mediator(&self) -> f64 {
        (1.0 - self.rhom2) * (1.0 - self.r2m1)
    }

    /// Level 1 outcome variance left after covariates and the mediator.
    fn sigma2_outcome(&self) -> f64 {
        (1.0 - self.rho2)
            * (1.0
                - self.r21
                - ((1.0 - self.rhom2) / (1.0 - self.rho2)) * self.esb1.powi(2) * (1.0 - self.r2m1))
    }
}

/// Square root of `variance`, or an error if it is negative or not finite.
fn checked_sqrt(variance: f64, context: &str) -> Result<f64> {
    if !variance.is_finite() {
        return Err(PowerError::Numerical(format!(
            "{} variance is not finite ({}); check the unit counts and mediator ICC",
            context, variance
        )));
    }
    if variance < 0.0 {
        return Err(PowerError::NegativeVariance {
            context: context.to_string(),
            value: variance,
        });
    }
    Ok(variance.sqrt())
}

/// Path `a` in a 2-2-1 design.
pub fn se_a221(m: &MediationParams) -> Result<f64> {
    let pq = m.pq();
    let variance = (1.0 - (m.r2m2 + pq * m.esa.powi(2))) / (pq * m.j);
    checked_sqrt(variance, "path a (2-2-1)")
}

/// Path `b` in a 2-2-1 design.
pub fn se_b221(m: &MediationParams) -> Result<f64> {
    let pq = m.pq();
    let mediator_left = 1.0 - (m.r2m2 + pq * m.esa.powi(2));
    let between = m.rho2
        * (1.0
            - (m.r22
                + pq * (m.esa * m.esb + m.escp).powi(2) / m.rho2
                + (m.esb.powi(2) / m.rho2) * mediator_left));
    let within = (1.0 - m.rho2) * (1.0 - m.r21) / m.n;
    let variance = (between + within) / (m.j * mediator_left);
    checked_sqrt(variance, "path b (2-2-1)")
}

/// Path `a` in a 2-1-1 design.
pub fn se_a211(m: &MediationParams) -> Result<f64> {
    let variance = (m.tau2_mediator() + m.sigma2_mediator() / m.n) / (m.j * m.pq());
    checked_sqrt(variance, "path a (2-1-1)")
}

/// Within-cluster path `b1` in a 2-1-1 design.
pub fn se_b1211(m: &MediationParams) -> Result<f64> {
    let variance = m.sigma2_outcome() / ((m.j * m.n - m.j) * m.sigma2_mediator());
    checked_sqrt(variance, "path b1 (2-1-1)")
}

/// Between-cluster path `B` in a 2-1-1 design.
pub fn se_b211(m: &MediationParams) -> Result<f64> {
    let pq = m.pq();
    let es_b = m.es_b_between;
    let tau2_outcome = m.rho2 * (1.0 - m.r22)
        - pq * (m.esa * es_b + m.escp).powi(2)
        - ((1.0 / pq) * es_b.powi(2) * m.rhom2 * (1.0 - m.r2m2)
            + (1.0 / pq) * es_b.powi(2) * (1.0 - m.rhom2) * (1.0 - m.r2m1) / m.n
            - m.esa.powi(2) * es_b.powi(2))
            / (1.0 / pq);
    let variance = (tau2_outcome + m.sigma2_outcome() / m.n)
        / (m.j * (m.tau2_mediator() + m.sigma2_mediator() / m.n));
    checked_sqrt(variance, "path B (2-1-1)")
}

/// Path `a` in a 3-2-1 design.
pub fn se_a321(m: &MediationParams) -> Result<f64> {
    let variance = (m.rhom3 * (1.0 - m.r2m3) + (1.0 - m.rhom3) * (1.0 - m.r2m2) / m.j)
        / (m.pq() * (m.k - 5.0));
    checked_sqrt(variance, "path a (3-2-1)")
}

/// Path `b` in a 3-2-1 design.
pub fn se_b321(m: &MediationParams) -> Result<f64> {
    let outcome = m.rho3 * (1.0 - m.r23)
        + m.rho2 * (1.0 - m.r22) / m.j
        + (1.0 - m.rho3 - m.rho2) * (1.0 - m.r21) / (m.n * m.j);
    let mediator = m.rhom3 * (1.0 - m.r2m3) + (1.0 - m.rhom3) * (1.0 - m.r2m2) / m.j;
    let variance = outcome / ((m.k - 6.0) * mediator);
    checked_sqrt(variance, "path b (3-2-1)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_se_a221_no_covariates() {
        let m = MediationParams {
            j: 40.0,
            ..Default::default()
        };
        // 1 / (0.25 * 40) = 0.1
        assert_abs_diff_eq!(se_a221(&m).unwrap(), 0.1_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_se_a211_shrinks_with_clusters() {
        let base = MediationParams {
            esa: 0.2,
            rhom2: 0.2,
            n: 20.0,
            j: 40.0,
            ..Default::default()
        };
        let more = MediationParams {
            j: 80.0,
            ..base.clone()
        };
        let small = se_a211(&more).unwrap();
        let large = se_a211(&base).unwrap();
        assert!(small < large);
        assert_abs_diff_eq!(large / small, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_se_b1211() {
        let m = MediationParams {
            rho2: 0.2,
            rhom2: 0.2,
            n: 11.0,
            j: 10.0,
            ..Default::default()
        };
        // sig2y = 0.8, sig2m = 0.8, J n - J = 100
        assert_abs_diff_eq!(se_b1211(&m).unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_three_level_paths() {
        let m = MediationParams {
            rho2: 0.1,
            rho3: 0.1,
            rhom3: 0.2,
            n: 20.0,
            j: 4.0,
            k: 30.0,
            ..Default::default()
        };
        assert!(se_a321(&m).unwrap() > 0.0);
        assert!(se_b321(&m).unwrap() > 0.0);

        let too_few = MediationParams { k: 5.5, ..m };
        assert!(matches!(se_b321(&too_few), Err(PowerError::NegativeVariance { .. })));
    }

    #[test]
    fn test_zero_mediator_icc_is_an_error() {
        // rhom2 left at its default of 0 makes the level 2 mediator variance 0 / 0.
        let m = MediationParams {
            n: 10.0,
            j: 20.0,
            ..Default::default()
        };
        assert!(matches!(se_b211(&m), Err(PowerError::Numerical(_))));
        assert!(matches!(se_a211(&m), Err(PowerError::Numerical(_))));
    }

    #[test]
    fn test_default_units_are_rejected() {
        let m = MediationParams::default();
        assert!(se_a321(&m).is_err());
        assert!(se_a211(&m).is_err());
    }

    #[test]
    fn test_negative_variance_rejected() {
        let m = MediationParams {
            r2m2: 1.2,
            j: 10.0,
            ..Default::default()
        };
        assert!(matches!(se_a221(&m), Err(PowerError::NegativeVariance { .. })));
    }
}
