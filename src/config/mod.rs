//! Serializable analysis requests.

use crate::design::{
    mde_design, power_design, sample_size_design, DesignKind, DesignMde, DesignParams,
    DesignPower, DesignSampleSize, DesignSpec,
};
use crate::error::{PowerError, Result};
use crate::estimate::TestParameters;
use crate::solve::SolverConfig;
use serde::{Deserialize, Serialize};

/// Quantity to solve for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solve", rename_all = "snake_case")]
pub enum Analysis {
    /// Minimum detectable effect at a target power.
    Mde { power: f64 },
    /// Power to detect an effect size.
    Power { effect_size: f64 },
    /// Minimum outermost unit count for an effect size and target power.
    SampleSize {
        effect_size: f64,
        power: f64,
        #[serde(default)]
        solver: SolverConfig,
    },
}

/// A complete analysis: design, test settings and the quantity to solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Significance settings.
    #[serde(default)]
    pub test: TestParameters,
    /// Design and its parameters.
    pub design: DesignSpec,
    /// What to compute.
    pub analysis: Analysis,
}

/// Result of running an [`AnalysisConfig`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Mde(DesignMde),
    Power(DesignPower),
    SampleSize(DesignSampleSize),
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(PowerError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(PowerError::from)
    }

    /// Run the analysis.
    pub fn run(&self) -> Result<AnalysisOutcome> {
        match &self.analysis {
            Analysis::Mde { power } => {
                mde_design(&self.design, *power, self.test).map(AnalysisOutcome::Mde)
            }
            Analysis::Power { effect_size } => {
                power_design(&self.design, *effect_size, self.test).map(AnalysisOutcome::Power)
            }
            Analysis::SampleSize {
                effect_size,
                power,
                solver,
            } => sample_size_design(&self.design, *effect_size, *power, self.test, solver)
                .map(AnalysisOutcome::SampleSize),
        }
    }

    /// Example configuration: MDE of a three-level blocked design.
    pub fn example() -> Self {
        Self {
            name: "bcra3f2-mde".to_string(),
            description: Some(
                "Minimum detectable effect, 5 blocks of 44 schools with 20 students each"
                    .to_string(),
            ),
            test: TestParameters::new(0.05, true),
            design: DesignSpec::new(
                DesignKind::Bcra3f2,
                DesignParams {
                    rho2: 0.10,
                    n: Some(20.0),
                    j: Some(44.0),
                    k: Some(5.0),
                    ..Default::default()
                },
            ),
            analysis: Analysis::Mde { power: 0.80 },
        }
    }
}

impl AnalysisOutcome {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(PowerError::from)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(PowerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_config_yaml_round_trip() {
        let config = AnalysisConfig::example();
        let yaml = config.to_yaml().unwrap();
        let parsed = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_run_example() {
        let outcome = AnalysisConfig::example().run().unwrap();
        match outcome {
            AnalysisOutcome::Mde(result) => {
                assert_abs_diff_eq!(result.result.minimum_detectable_effect, 0.145, epsilon = 1e-3);
                assert_eq!(result.df, 210.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_sample_size_from_yaml() {
        let yaml = r#"
name: individual
test:
  alpha: 0.05
design:
  kind: ira1r1
analysis:
  solve: sample_size
  effect_size: 0.356
  power: 0.8
"#;
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert!(config.test.two_tailed);
        let outcome = config.run().unwrap();
        let AnalysisOutcome::SampleSize(result) = outcome else {
            panic!("expected a sample size");
        };
        let n = result.solution.sample_size.unwrap();
        assert!((249..=251).contains(&n));

        let json = AnalysisOutcome::SampleSize(result).to_json().unwrap();
        assert!(json.contains("\"level\": \"n\""));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            AnalysisConfig::from_yaml("name: [unclosed"),
            Err(PowerError::Yaml(_))
        ));
    }
}
