//! MDE, power and sample size for a concrete design.

use super::kind::{DesignKind, Level};
use super::spec::DesignSpec;
use crate::error::Result;
use crate::estimate::{mde, power, MdeResult, TestParameters};
use crate::solve::{sample_size, SampleSizeSolution, SolverConfig};
use serde::Serialize;

/// Minimum detectable effect of a design.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DesignMde {
    pub design: DesignKind,
    pub df: f64,
    pub standard_error: f64,
    #[serde(flatten)]
    pub result: MdeResult,
}

/// Power of a design.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DesignPower {
    pub design: DesignKind,
    pub df: f64,
    pub standard_error: f64,
    pub effect_size: f64,
    pub power: f64,
}

/// Minimum sample size of a design at its outermost level.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DesignSampleSize {
    pub design: DesignKind,
    pub level: Level,
    #[serde(flatten)]
    pub solution: SampleSizeSolution,
}

/// Minimum detectable effect of `spec` at `target_power`.
pub fn mde_design(spec: &DesignSpec, target_power: f64, test: TestParameters) -> Result<DesignMde> {
    let df = spec.df()?;
    let standard_error = spec.standard_error()?;
    let result = mde(target_power, test.alpha, standard_error, df, test.two_tailed)?;

    Ok(DesignMde {
        design: spec.kind,
        df,
        standard_error,
        result,
    })
}

/// Power of `spec` to detect `effect_size`.
pub fn power_design(spec: &DesignSpec, effect_size: f64, test: TestParameters) -> Result<DesignPower> {
    let df = spec.df()?;
    let standard_error = spec.standard_error()?;
    let value = power(effect_size, test.alpha, standard_error, df, test.two_tailed)?;

    Ok(DesignPower {
        design: spec.kind,
        df,
        standard_error,
        effect_size,
        power: value,
    })
}

/// Smallest outermost unit count of `spec` reaching `target_power` for
/// `effect_size`. The outermost count in `spec`, if any, is ignored.
pub fn sample_size_design(
    spec: &DesignSpec,
    effect_size: f64,
    target_power: f64,
    test: TestParameters,
    solver: &SolverConfig,
) -> Result<DesignSampleSize> {
    let relation = spec.relation()?;
    let solution = sample_size(
        effect_size,
        target_power,
        test.alpha,
        test.two_tailed,
        solver,
        &relation,
    )?;

    Ok(DesignSampleSize {
        design: spec.kind,
        level: relation.level(),
        solution,
    })
}
