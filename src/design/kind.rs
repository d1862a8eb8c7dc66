//! Catalogue of multilevel randomized designs.

use crate::error::{PowerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nesting level whose unit count is a design input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Level 1 units per level 2 unit.
    #[serde(rename = "n")]
    N,
    /// Level 2 units per level 3 unit (or in total for two-level designs).
    #[serde(rename = "J")]
    J,
    /// Level 3 units.
    #[serde(rename = "K")]
    K,
    /// Level 4 units.
    #[serde(rename = "L")]
    L,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::N => "n",
            Level::J => "J",
            Level::K => "K",
            Level::L => "L",
        };
        write!(f, "{}", s)
    }
}

/// Identifier of a multilevel design.
///
/// Naming: `ira` individual random assignment, `bira` blocked individual
/// random assignment, `cra` cluster random assignment, `bcra` blocked cluster
/// random assignment. The digit after the prefix is the number of levels, the
/// letter is the block effect (`c` constant, `f` fixed, `r` random) and the
/// final digit is the level at which treatment is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignKind {
    Bcra3f2,
    Bcra3r2,
    Bcra4f3,
    Bcra4r2,
    Bcra4r3,
    Bira2c1,
    Bira2f1,
    Bira2r1,
    Bira3r1,
    Bira4r1,
    Cra2r2,
    Cra3r3,
    Cra4r4,
    Ira1r1,
}

impl DesignKind {
    /// All supported designs.
    pub const ALL: [DesignKind; 14] = [
        DesignKind::Bcra3f2,
        DesignKind::Bcra3r2,
        DesignKind::Bcra4f3,
        DesignKind::Bcra4r2,
        DesignKind::Bcra4r3,
        DesignKind::Bira2c1,
        DesignKind::Bira2f1,
        DesignKind::Bira2r1,
        DesignKind::Bira3r1,
        DesignKind::Bira4r1,
        DesignKind::Cra2r2,
        DesignKind::Cra3r3,
        DesignKind::Cra4r4,
        DesignKind::Ira1r1,
    ];

    /// Short identifier, e.g. "bcra3f2".
    pub fn name(&self) -> &'static str {
        match self {
            DesignKind::Bcra3f2 => "bcra3f2",
            DesignKind::Bcra3r2 => "bcra3r2",
            DesignKind::Bcra4f3 => "bcra4f3",
            DesignKind::Bcra4r2 => "bcra4r2",
            DesignKind::Bcra4r3 => "bcra4r3",
            DesignKind::Bira2c1 => "bira2c1",
            DesignKind::Bira2f1 => "bira2f1",
            DesignKind::Bira2r1 => "bira2r1",
            DesignKind::Bira3r1 => "bira3r1",
            DesignKind::Bira4r1 => "bira4r1",
            DesignKind::Cra2r2 => "cra2r2",
            DesignKind::Cra3r3 => "cra3r3",
            DesignKind::Cra4r4 => "cra4r4",
            DesignKind::Ira1r1 => "ira1r1",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            DesignKind::Bcra3f2 => {
                "Three-level blocked (fixed) cluster random assignment, treatment at level 2"
            }
            DesignKind::Bcra3r2 => {
                "Three-level blocked (random) cluster random assignment, treatment at level 2"
            }
            DesignKind::Bcra4f3 => {
                "Four-level blocked (fixed) cluster random assignment, treatment at level 3"
            }
            DesignKind::Bcra4r2 => {
                "Four-level blocked (random) cluster random assignment, treatment at level 2"
            }
            DesignKind::Bcra4r3 => {
                "Four-level blocked (random) cluster random assignment, treatment at level 3"
            }
            DesignKind::Bira2c1 => {
                "Two-level blocked (constant) individual random assignment, treatment at level 1"
            }
            DesignKind::Bira2f1 => {
                "Two-level blocked (fixed) individual random assignment, treatment at level 1"
            }
            DesignKind::Bira2r1 => {
                "Two-level blocked (random) individual random assignment, treatment at level 1"
            }
            DesignKind::Bira3r1 => {
                "Three-level blocked (random) individual random assignment, treatment at level 1"
            }
            DesignKind::Bira4r1 => {
                "Four-level blocked (random) individual random assignment, treatment at level 1"
            }
            DesignKind::Cra2r2 => "Two-level cluster random assignment, treatment at level 2",
            DesignKind::Cra3r3 => "Three-level cluster random assignment, treatment at level 3",
            DesignKind::Cra4r4 => "Four-level cluster random assignment, treatment at level 4",
            DesignKind::Ira1r1 => "Individual random assignment",
        }
    }

    /// Number of nesting levels.
    pub fn depth(&self) -> usize {
        self.units().len()
    }

    /// Unit counts the design's variance and df depend on, innermost first.
    pub fn units(&self) -> &'static [Level] {
        match self {
            DesignKind::Ira1r1 => &[Level::N],
            DesignKind::Bira2c1 | DesignKind::Bira2f1 | DesignKind::Bira2r1 | DesignKind::Cra2r2 => {
                &[Level::N, Level::J]
            }
            DesignKind::Bcra3f2 | DesignKind::Bcra3r2 | DesignKind::Bira3r1 | DesignKind::Cra3r3 => {
                &[Level::N, Level::J, Level::K]
            }
            DesignKind::Bcra4f3
            | DesignKind::Bcra4r2
            | DesignKind::Bcra4r3
            | DesignKind::Bira4r1
            | DesignKind::Cra4r4 => &[Level::N, Level::J, Level::K, Level::L],
        }
    }

    /// Level solved for by the sample size solver (the outermost one).
    pub fn solved_level(&self) -> Level {
        let units = self.units();
        units[units.len() - 1]
    }
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DesignKind {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        DesignKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == lower)
            .ok_or_else(|| {
                PowerError::InvalidParameter(format!(
                    "Unknown design '{}'. Available: {}",
                    s,
                    DesignKind::ALL.map(|k| k.name()).join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in DesignKind::ALL {
            assert_eq!(kind.name().parse::<DesignKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!("BCRA3F2".parse::<DesignKind>().unwrap(), DesignKind::Bcra3f2);
        assert!("cra5r5".parse::<DesignKind>().is_err());
    }

    #[test]
    fn test_depth_matches_name() {
        for kind in DesignKind::ALL {
            let digit = kind
                .name()
                .chars()
                .find(|c| c.is_ascii_digit())
                .and_then(|c| c.to_digit(10))
                .unwrap() as usize;
            assert_eq!(kind.depth(), digit, "{}", kind);
        }
    }

    #[test]
    fn test_solved_level() {
        assert_eq!(DesignKind::Ira1r1.solved_level(), Level::N);
        assert_eq!(DesignKind::Cra2r2.solved_level(), Level::J);
        assert_eq!(DesignKind::Bcra3f2.solved_level(), Level::K);
        assert_eq!(DesignKind::Bira4r1.solved_level(), Level::L);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DesignKind::Bira2c1).unwrap();
        assert_eq!(json, "\"bira2c1\"");
        let level: Level = serde_json::from_str("\"J\"").unwrap();
        assert_eq!(level, Level::J);
    }
}
