//! Effect and power estimation from a standardized standard error and
//! degrees of freedom.

pub mod critical;
pub mod mde;
pub mod power;

pub use critical::{critical_values, CriticalValues, TestParameters};
pub use mde::{mde, mde_with, MdeResult};
pub use power::{power, power_with};

use crate::error::{PowerError, Result};

/// Reject inputs for which the t approximation is undefined.
pub(crate) fn check_domain(sse: f64, df: f64) -> Result<()> {
    if sse < 0.0 {
        return Err(PowerError::Domain(format!(
            "standardized standard error cannot be less than 0, got {}",
            sse
        )));
    }
    if df < 1.0 {
        return Err(PowerError::Domain(format!(
            "degrees of freedom must be at least 1, got {}",
            df
        )));
    }
    Ok(())
}
