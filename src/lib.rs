//! Power Analysis for Multilevel Randomized Experiments
//!
//! This library computes the minimum detectable effect size (MDE), the
//! statistical power and the minimum sample size of individual, blocked and
//! cluster randomized designs with up to four nesting levels.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **distribution**: Central and noncentral t-distribution primitives
//! - **estimate**: MDE and power from a standardized standard error and df
//! - **solve**: Minimum sample size by damped fixed-point iteration
//! - **design**: Variance and df formulas for the supported designs
//! - **mediation**: Power of Sobel and joint significance tests
//! - **config**: YAML analysis requests
//!
//! # Example
//!
//! ```no_run
//! use multilevel_power::prelude::*;
//!
//! // Two-level cluster randomized trial: 20 schools of 15 students
//! let design = DesignSpec::new(
//!     DesignKind::Cra2r2,
//!     DesignParams {
//!         rho2: 0.17,
//!         n: Some(15.0),
//!         j: Some(20.0),
//!         ..Default::default()
//!     },
//! );
//! let test = TestParameters::new(0.05, true);
//!
//! let effect = mde_design(&design, 0.80, test).unwrap();
//! let achieved = power_design(&design, 0.629, test).unwrap();
//! let schools = sample_size_design(&design, 0.629, 0.80, test, &SolverConfig::default()).unwrap();
//! ```

pub mod config;
pub mod design;
pub mod distribution;
pub mod error;
pub mod estimate;
pub mod mediation;
pub mod solve;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::{Analysis, AnalysisConfig, AnalysisOutcome};
    pub use crate::design::{
        mde_design, power_design, sample_size_design, DesignKind, DesignMde, DesignParams,
        DesignPower, DesignSampleSize, DesignSpec, Level,
    };
    pub use crate::distribution::{noncentral_t_cdf, StatrsT, TDistribution};
    pub use crate::error::{PowerError, Result};
    pub use crate::estimate::{
        critical_values, mde, mde_with, power, power_with, CriticalValues, MdeResult,
        TestParameters,
    };
    pub use crate::mediation::{power_joint, power_sobel, se_sobel, MediationParams, SOBEL_DF};
    pub use crate::solve::{
        sample_size, sample_size_with, FnRelation, SampleSizeSolution, SolverConfig,
        VarianceRelation,
    };
}
