//! Design parameters and the per-design variance and df formulas.

use super::kind::{DesignKind, Level};
use crate::error::{PowerError, Result};
use crate::solve::VarianceRelation;
use serde::{Deserialize, Serialize};

/// Parameters of a multilevel design.
///
/// Unit counts are optional because the sample size solver supplies the
/// outermost one itself. Parameters a design does not use are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParams {
    /// Level 1 units per level 2 unit (harmonic mean).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    /// Level 2 units per level 3 unit, or the number of level 2 units.
    #[serde(rename = "J", alias = "j", skip_serializing_if = "Option::is_none")]
    pub j: Option<f64>,
    /// Level 3 units per level 4 unit, or the number of level 3 units.
    #[serde(rename = "K", alias = "k", skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    /// Number of level 4 units.
    #[serde(rename = "L", alias = "l", skip_serializing_if = "Option::is_none")]
    pub l: Option<f64>,

    /// Unconditional intraclass correlations at levels 2-4.
    pub rho2: f64,
    pub rho3: f64,
    pub rho4: f64,

    /// Treatment effect heterogeneity at levels 2-4.
    pub omega2: f64,
    pub omega3: f64,
    pub omega4: f64,

    /// Outcome variance explained by covariates at levels 1-4.
    pub r21: f64,
    pub r22: f64,
    pub r23: f64,
    pub r24: f64,

    /// Treatment effect variance explained by covariates at levels 2-4.
    pub r2t2: f64,
    pub r2t3: f64,
    pub r2t4: f64,

    /// Proportion of units assigned to treatment.
    pub p: f64,

    /// Number of covariates at levels 1-4.
    pub g1: u32,
    pub g2: u32,
    pub g3: u32,
    pub g4: u32,
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            n: None,
            j: None,
            k: None,
            l: None,
            rho2: 0.0,
            rho3: 0.0,
            rho4: 0.0,
            omega2: 0.0,
            omega3: 0.0,
            omega4: 0.0,
            r21: 0.0,
            r22: 0.0,
            r23: 0.0,
            r24: 0.0,
            r2t2: 0.0,
            r2t3: 0.0,
            r2t4: 0.0,
            p: 0.5,
            g1: 0,
            g2: 0,
            g3: 0,
            g4: 0,
        }
    }
}

impl DesignParams {
    /// Unit count at `level`, if set.
    pub fn units(&self, level: Level) -> Option<f64> {
        match level {
            Level::N => self.n,
            Level::J => self.j,
            Level::K => self.k,
            Level::L => self.l,
        }
    }

    /// Set the unit count at `level`.
    pub fn set_units(&mut self, level: Level, count: f64) {
        match level {
            Level::N => self.n = Some(count),
            Level::J => self.j = Some(count),
            Level::K => self.k = Some(count),
            Level::L => self.l = Some(count),
        }
    }
}

/// Resolved unit counts; levels a design does not use are 1.
#[derive(Debug, Clone, Copy)]
struct Units {
    n: f64,
    j: f64,
    k: f64,
    l: f64,
}

impl Units {
    fn with(mut self, level: Level, count: f64) -> Self {
        match level {
            Level::N => self.n = count,
            Level::J => self.j = count,
            Level::K => self.k = count,
            Level::L => self.l = count,
        }
        self
    }
}

/// A design together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Which design.
    pub kind: DesignKind,
    /// Design parameters.
    #[serde(flatten)]
    pub params: DesignParams,
}

impl DesignSpec {
    /// Create a design specification.
    pub fn new(kind: DesignKind, params: DesignParams) -> Self {
        Self { kind, params }
    }

    /// Copy of this specification with the unit count at `level` replaced.
    pub fn with_units(&self, level: Level, count: f64) -> Self {
        let mut spec = self.clone();
        spec.params.set_units(level, count);
        spec
    }

    /// Standardized variance of the treatment effect estimator.
    pub fn variance(&self) -> Result<f64> {
        let units = self.resolve_units(None)?;
        self.checked_variance(&units)
    }

    /// Standardized standard error of the treatment effect estimator.
    pub fn standard_error(&self) -> Result<f64> {
        Ok(self.variance()?.sqrt())
    }

    /// Degrees of freedom of the test.
    pub fn df(&self) -> Result<f64> {
        let units = self.resolve_units(None)?;
        let df = self.raw_df(&units);
        Ok(if self.rounds_df() { df.ceil() } else { df })
    }

    /// Relation for the sample size solver, treating the design's outermost
    /// unit count as unknown.
    pub fn relation(&self) -> Result<DesignRelation<'_>> {
        let level = self.kind.solved_level();
        let units = self.resolve_units(Some(level))?;
        Ok(DesignRelation {
            spec: self,
            units,
            level,
        })
    }

    fn resolve_units(&self, unknown: Option<Level>) -> Result<Units> {
        let mut units = Units {
            n: 1.0,
            j: 1.0,
            k: 1.0,
            l: 1.0,
        };
        for &level in self.kind.units() {
            if Some(level) == unknown {
                continue;
            }
            let count = self.params.units(level).ok_or_else(|| PowerError::MissingUnits {
                design: self.kind.to_string(),
                level: level.to_string(),
            })?;
            units = units.with(level, count);
        }
        Ok(units)
    }

    fn checked_variance(&self, units: &Units) -> Result<f64> {
        let variance = self.raw_variance(units);
        if variance < 0.0 {
            return Err(PowerError::NegativeVariance {
                context: self.kind.to_string(),
                value: variance,
            });
        }
        Ok(variance)
    }

    /// Designs whose reported df is rounded up.
    fn rounds_df(&self) -> bool {
        matches!(
            self.kind,
            DesignKind::Bcra3f2 | DesignKind::Bira2c1 | DesignKind::Bira2r1 | DesignKind::Cra2r2
        )
    }

    fn raw_df(&self, u: &Units) -> f64 {
        let p = &self.params;
        let (g1, g2, g3, g4) = (p.g1 as f64, p.g2 as f64, p.g3 as f64, p.g4 as f64);
        match self.kind {
            DesignKind::Bcra3f2 => u.k * (u.j - 2.0) - g2,
            DesignKind::Bcra3r2 | DesignKind::Bira3r1 => u.k - g3 - 1.0,
            DesignKind::Bcra4f3 => u.l * (u.k - 2.0) - g3,
            DesignKind::Bcra4r2 | DesignKind::Bcra4r3 | DesignKind::Bira4r1 => u.l - g4 - 1.0,
            DesignKind::Bira2c1 => u.j * (u.n - 1.0) - g1 - 1.0,
            DesignKind::Bira2f1 => u.j * (u.n - 2.0) - g1,
            DesignKind::Bira2r1 => u.j - g2 - 1.0,
            DesignKind::Cra2r2 => u.j - g2 - 2.0,
            DesignKind::Cra3r3 => u.k - g3 - 2.0,
            DesignKind::Cra4r4 => u.l - g4 - 2.0,
            DesignKind::Ira1r1 => u.n - g1 - 2.0,
        }
    }

    fn raw_variance(&self, u: &Units) -> f64 {
        let p = &self.params;
        let pq = p.p * (1.0 - p.p);
        let (n, j, k, l) = (u.n, u.j, u.k, u.l);

        match self.kind {
            DesignKind::Bcra3f2 => {
                p.rho2 * (1.0 - p.r22) / (pq * j * k)
                    + (1.0 - p.rho2) * (1.0 - p.r21) / (pq * j * k * n)
            }
            DesignKind::Bcra3r2 => {
                p.rho3 * p.omega3 * (1.0 - p.r2t3) / k
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k)
                    + (1.0 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * n)
            }
            DesignKind::Bcra4f3 => {
                p.rho3 * (1.0 - p.r23) / (pq * k * l)
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k * l)
                    + (1.0 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * l * n)
            }
            DesignKind::Bcra4r2 => {
                p.rho4 * p.omega4 * (1.0 - p.r2t4) / l
                    + p.rho3 * p.omega3 * (1.0 - p.r2t3) / (k * l)
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k * l)
                    + (1.0 - p.rho4 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * l * n)
            }
            DesignKind::Bcra4r3 => {
                p.rho4 * p.omega4 * (1.0 - p.r2t4) / l
                    + p.rho3 * (1.0 - p.r23) / (pq * k * l)
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k * l)
                    + (1.0 - p.rho4 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * l * n)
            }
            DesignKind::Bira2c1 | DesignKind::Bira2f1 => (1.0 - p.r21) / (pq * j * n),
            DesignKind::Bira2r1 => {
                p.rho2 * p.omega2 * (1.0 - p.r2t2) / j
                    + (1.0 - p.rho2) * (1.0 - p.r21) / (pq * j * n)
            }
            DesignKind::Bira3r1 => {
                p.rho3 * p.omega3 * (1.0 - p.r2t3) / k
                    + p.rho2 * p.omega2 * (1.0 - p.r2t2) / (j * k)
                    + (1.0 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * n)
            }
            DesignKind::Bira4r1 => {
                p.rho4 * p.omega4 * (1.0 - p.r2t4) / l
                    + p.rho3 * p.omega3 * (1.0 - p.r2t3) / (k * l)
                    + p.rho2 * p.omega2 * (1.0 - p.r2t2) / (j * k * l)
                    + (1.0 - p.rho4 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * l * n)
            }
            DesignKind::Cra2r2 => {
                p.rho2 * (1.0 - p.r22) / (pq * j) + (1.0 - p.rho2) * (1.0 - p.r21) / (pq * j * n)
            }
            DesignKind::Cra3r3 => {
                p.rho3 * (1.0 - p.r23) / (pq * k)
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k)
                    + (1.0 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * n)
            }
            DesignKind::Cra4r4 => {
                p.rho4 * (1.0 - p.r24) / (pq * l)
                    + p.rho3 * (1.0 - p.r23) / (pq * k * l)
                    + p.rho2 * (1.0 - p.r22) / (pq * j * k * l)
                    + (1.0 - p.rho4 - p.rho3 - p.rho2) * (1.0 - p.r21) / (pq * j * k * l * n)
            }
            DesignKind::Ira1r1 => (1.0 - p.r21) / (pq * n),
        }
    }
}

/// Solver relation for a design, with its outermost unit count unknown.
#[derive(Debug, Clone, Copy)]
pub struct DesignRelation<'a> {
    spec: &'a DesignSpec,
    units: Units,
    level: Level,
}

impl DesignRelation<'_> {
    /// Level being solved for.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl VarianceRelation for DesignRelation<'_> {
    fn df(&self, units: f64) -> f64 {
        match self.spec.kind {
            // Solved with one fewer df than the reported test uses.
            DesignKind::Ira1r1 => units - self.spec.params.g1 as f64 - 1.0,
            _ => self.spec.raw_df(&self.units.with(self.level, units)),
        }
    }

    fn unit_variance(&self, _units: f64) -> Result<f64> {
        // Every variance term is divided by the outermost count; set it to 1.
        self.spec.checked_variance(&self.units.with(self.level, 1.0))
    }
}
