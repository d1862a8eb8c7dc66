//! Minimum sample size by damped fixed-point iteration.
//!
//! The degrees of freedom depend on the unknown unit count, so there is no
//! closed form. Starting from an initial guess, each round computes the
//! critical multiplier at the current df, proposes
//! `(M / effect_size)^2 * unit_variance`, and moves halfway towards the
//! proposal. The loop is bounded; non-convergence and infeasible df are
//! reported in the result rather than raised.

use crate::distribution::{StatrsT, TDistribution};
use crate::error::{PowerError, Result};
use crate::estimate::{critical_values, TestParameters};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Relation between the unknown unit count and the test's variance and df.
pub trait VarianceRelation {
    /// Degrees of freedom when the unknown level holds `units` units.
    fn df(&self, units: f64) -> f64;

    /// Standardized variance of the effect estimator multiplied by `units`.
    ///
    /// For the usual designs every variance component is divided by the
    /// outermost unit count, so this does not depend on `units`.
    fn unit_variance(&self, units: f64) -> Result<f64>;
}

/// [`VarianceRelation`] built from two closures.
pub struct FnRelation<F, V> {
    df: F,
    unit_variance: V,
}

impl<F, V> FnRelation<F, V>
where
    F: Fn(f64) -> f64,
    V: Fn(f64) -> f64,
{
    /// Create a relation from a df formula and a unit-variance formula.
    pub fn new(df: F, unit_variance: V) -> Self {
        Self { df, unit_variance }
    }
}

impl<F, V> VarianceRelation for FnRelation<F, V>
where
    F: Fn(f64) -> f64,
    V: Fn(f64) -> f64,
{
    fn df(&self, units: f64) -> f64 {
        (self.df)(units)
    }

    fn unit_variance(&self, units: f64) -> Result<f64> {
        Ok((self.unit_variance)(units))
    }
}

/// Configuration for the sample size solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Initial guess for the unknown unit count.
    pub initial_guess: f64,
    /// Convergence tolerance on successive proposals.
    pub tol: f64,
    /// Maximum number of rounds.
    pub max_iter: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 10.0,
            tol: 0.10,
            max_iter: 100,
        }
    }
}

/// Outcome of the sample size solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeSolution {
    /// Minimum sample size (ceiling of the final estimate), or `None` when no
    /// feasible solution was reached.
    pub sample_size: Option<u64>,
    /// Continuous estimate when the loop stopped.
    pub estimate: f64,
    /// Degrees of freedom at the last evaluated guess.
    pub df: f64,
    /// Rounds evaluated.
    pub iterations: usize,
    /// Whether successive proposals came within tolerance.
    pub converged: bool,
    /// Last |next - guess|, NaN if no proposal was made.
    pub residual: f64,
}

impl SampleSizeSolution {
    /// Whether a sample size was found.
    pub fn is_defined(&self) -> bool {
        self.sample_size.is_some()
    }
}

/// Solve for the smallest unit count that reaches `power` for `effect_size`.
///
/// # Arguments
/// * `effect_size` - Standardized effect to detect
/// * `power` - Target power
/// * `alpha` - Probability of Type I error
/// * `two_tailed` - Whether the test is two-tailed
/// * `config` - Initial guess, tolerance and iteration budget
/// * `relation` - Design-specific df and variance relation
pub fn sample_size<R: VarianceRelation>(
    effect_size: f64,
    power: f64,
    alpha: f64,
    two_tailed: bool,
    config: &SolverConfig,
    relation: &R,
) -> Result<SampleSizeSolution> {
    sample_size_with(&StatrsT, effect_size, power, alpha, two_tailed, config, relation)
}

/// [`sample_size`] with an explicit distribution provider.
pub fn sample_size_with<D: TDistribution, R: VarianceRelation>(
    dist: &D,
    effect_size: f64,
    power: f64,
    alpha: f64,
    two_tailed: bool,
    config: &SolverConfig,
    relation: &R,
) -> Result<SampleSizeSolution> {
    if config.max_iter == 0 {
        return Err(PowerError::InvalidParameter(
            "solver needs at least one iteration".to_string(),
        ));
    }

    let test = TestParameters::new(alpha, two_tailed);
    let mut guess = config.initial_guess;
    let mut df = 0.0;
    let mut residual = f64::NAN;
    let mut converged = false;
    let mut iterations = 0;

    for round in 0..config.max_iter {
        df = relation.df(guess);
        if !df.is_finite() || df <= 0.0 {
            debug!("round {}: df = {} infeasible at guess {}", round, df, guess);
            break;
        }
        iterations = round + 1;

        let cv = critical_values(dist, test, power, df)?;
        let next = (cv.multiplier / effect_size).powi(2) * relation.unit_variance(guess)?;
        residual = (next - guess).abs();
        debug!(
            "round {}: guess = {:.4}, df = {:.2}, next = {:.4}",
            round, guess, df, next
        );

        if residual < config.tol {
            converged = true;
            break;
        }
        guess = (next + guess) / 2.0;
    }

    if !converged && df > 0.0 && df.is_finite() {
        warn!(
            "sample size solver stopped after {} rounds without converging (residual = {})",
            iterations, residual
        );
    }

    let sample_size = if df > 0.0 && df.is_finite() && guess.is_finite() && guess > 0.0 {
        Some(guess.ceil() as u64)
    } else {
        None
    };

    Ok(SampleSizeSolution {
        sample_size,
        estimate: guess,
        df,
        iterations,
        converged,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn individual(g1: f64) -> FnRelation<impl Fn(f64) -> f64, impl Fn(f64) -> f64> {
        // p = 0.5, no covariates: variance = 1 / (p (1 - p) n)
        FnRelation::new(move |n: f64| n - g1 - 1.0, |_: f64| 4.0)
    }

    #[test]
    fn test_individual_design_converges() {
        let solution =
            sample_size(0.356, 0.8, 0.05, true, &SolverConfig::default(), &individual(0.0)).unwrap();
        assert!(solution.converged);
        let n = solution.sample_size.unwrap();
        assert!((249..=251).contains(&n), "n = {}", n);
        assert!(solution.residual < 0.10);
    }

    #[test]
    fn test_infeasible_df_is_undefined() {
        // 20 covariates with an initial guess of 10 units leaves negative df.
        let solution =
            sample_size(0.356, 0.8, 0.05, true, &SolverConfig::default(), &individual(20.0)).unwrap();
        assert_eq!(solution.sample_size, None);
        assert!(!solution.is_defined());
        assert_eq!(solution.iterations, 0);
        assert!(solution.df < 0.0);
    }

    #[test]
    fn test_budget_exhaustion_keeps_estimate() {
        let config = SolverConfig {
            max_iter: 2,
            ..SolverConfig::default()
        };
        let solution = sample_size(0.356, 0.8, 0.05, true, &config, &individual(0.0)).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 2);
        assert!(solution.sample_size.is_some());
        assert!(solution.residual >= 0.10);
    }

    #[test]
    fn test_infinite_df_is_undefined() {
        let relation = FnRelation::new(|_: f64| f64::INFINITY, |_: f64| 4.0);
        let solution =
            sample_size(0.3, 0.8, 0.05, true, &SolverConfig::default(), &relation).unwrap();
        assert_eq!(solution.sample_size, None);
    }

    #[test]
    fn test_monotone_in_power_and_effect() {
        let relation = individual(0.0);
        let config = SolverConfig::default();
        let solve = |es: f64, pw: f64| {
            sample_size(es, pw, 0.05, true, &config, &relation)
                .unwrap()
                .sample_size
                .unwrap()
        };

        assert!(solve(0.3, 0.7) <= solve(0.3, 0.8));
        assert!(solve(0.3, 0.8) <= solve(0.3, 0.9));
        assert!(solve(0.4, 0.8) <= solve(0.3, 0.8));
        assert!(solve(0.5, 0.8) <= solve(0.4, 0.8));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = SolverConfig {
            max_iter: 0,
            ..SolverConfig::default()
        };
        assert!(sample_size(0.3, 0.8, 0.05, true, &config, &individual(0.0)).is_err());
    }
}
