//! mlpower - Multilevel Power Analysis CLI
//!
//! Command-line interface for MDE, power and sample size calculations.

use clap::{Parser, Subcommand, ValueEnum};
use multilevel_power::config::{AnalysisConfig, AnalysisOutcome};
use multilevel_power::design::DesignKind;
use multilevel_power::error::Result;
use multilevel_power::estimate::{mde, power};
use multilevel_power::solve::{sample_size, FnRelation, SolverConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Output serialization format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Multilevel Power Analysis
#[derive(Parser)]
#[command(name = "mlpower")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },

    /// List the supported designs
    Designs,

    /// Minimum detectable effect from a standardized standard error and df
    Mde {
        /// Standardized standard error
        #[arg(long)]
        sse: f64,

        /// Degrees of freedom
        #[arg(long)]
        df: f64,

        /// Target power (default: 0.8)
        #[arg(long, default_value = "0.8")]
        power: f64,

        /// Probability of Type I error (default: 0.1)
        #[arg(long, default_value = "0.1")]
        alpha: f64,

        /// Use a one-tailed test
        #[arg(long)]
        one_tailed: bool,
    },

    /// Power from an effect size, standardized standard error and df
    Power {
        /// Standardized effect size
        #[arg(short, long)]
        effect_size: f64,

        /// Standardized standard error
        #[arg(long)]
        sse: f64,

        /// Degrees of freedom
        #[arg(long)]
        df: f64,

        /// Probability of Type I error (default: 0.1)
        #[arg(long, default_value = "0.1")]
        alpha: f64,

        /// Use a one-tailed test
        #[arg(long)]
        one_tailed: bool,
    },

    /// Minimum sample size when variance is proportional to 1 / units
    /// and df = units - df_offset
    SampleSize {
        /// Standardized effect size
        #[arg(short, long)]
        effect_size: f64,

        /// Variance of the effect estimator times the unit count
        /// (4.0 for an individual design with half treated)
        #[arg(long, default_value = "4.0")]
        unit_variance: f64,

        /// df = units - df_offset
        #[arg(long, default_value = "1.0")]
        df_offset: f64,

        /// Target power (default: 0.8)
        #[arg(long, default_value = "0.8")]
        power: f64,

        /// Probability of Type I error (default: 0.1)
        #[arg(long, default_value = "0.1")]
        alpha: f64,

        /// Use a one-tailed test
        #[arg(long)]
        one_tailed: bool,

        /// Initial guess for the unit count
        #[arg(long, default_value = "10")]
        initial_guess: f64,

        /// Convergence tolerance
        #[arg(long, default_value = "0.1")]
        tol: f64,

        /// Maximum number of iterations
        #[arg(long, default_value = "100")]
        max_iter: usize,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, format } => cmd_run(&config, format),

        Commands::Example { output } => cmd_example(&output),

        Commands::Designs => {
            cmd_designs();
            Ok(())
        }

        Commands::Mde {
            sse,
            df,
            power,
            alpha,
            one_tailed,
        } => mde(power, alpha, sse, df, !one_tailed).and_then(|r| print_json(&r)),

        Commands::Power {
            effect_size,
            sse,
            df,
            alpha,
            one_tailed,
        } => power(effect_size, alpha, sse, df, !one_tailed).and_then(|p| print_json(&p)),

        Commands::SampleSize {
            effect_size,
            unit_variance,
            df_offset,
            power,
            alpha,
            one_tailed,
            initial_guess,
            tol,
            max_iter,
        } => {
            let solver = SolverConfig {
                initial_guess,
                tol,
                max_iter,
            };
            let relation = FnRelation::new(move |units: f64| units - df_offset, move |_: f64| unit_variance);
            sample_size(effect_size, power, alpha, !one_tailed, &solver, &relation)
                .and_then(|s| print_json(&s))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run an analysis from configuration
fn cmd_run(config_path: &PathBuf, format: OutputFormat) -> Result<()> {
    eprintln!("Loading analysis configuration from {:?}...", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&config_str)?;

    eprintln!("Running analysis '{}' ({})...", config.name, config.design.kind);
    let outcome = config.run()?;

    if let AnalysisOutcome::SampleSize(result) = &outcome {
        if !result.solution.converged {
            eprintln!(
                "Warning: solver did not converge after {} iterations",
                result.solution.iterations
            );
        }
    }

    let rendered = match format {
        OutputFormat::Json => outcome.to_json()?,
        OutputFormat::Yaml => outcome.to_yaml()?,
    };
    println!("{}", rendered);

    Ok(())
}

/// Write an example configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let yaml = AnalysisConfig::example().to_yaml()?;
    std::fs::write(output_path, yaml)?;
    eprintln!("Example configuration written to {:?}", output_path);
    Ok(())
}

/// List supported designs
fn cmd_designs() {
    for kind in DesignKind::ALL {
        let units: Vec<String> = kind.units().iter().map(|l| l.to_string()).collect();
        println!(
            "{:<8} solves {}  units [{}]  {}",
            kind.name(),
            kind.solved_level(),
            units.join(", "),
            kind.description()
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
