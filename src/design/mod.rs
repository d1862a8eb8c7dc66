//! Multilevel randomized designs.
//!
//! Each design contributes a standardized variance formula and a degrees of
//! freedom formula; the estimators and the solver are shared.

pub mod analysis;
pub mod kind;
pub mod spec;

pub use analysis::{
    mde_design, power_design, sample_size_design, DesignMde, DesignPower, DesignSampleSize,
};
pub use kind::{DesignKind, Level};
pub use spec::{DesignParams, DesignRelation, DesignSpec};
