//! Sample size solving.

pub mod sample_size;

pub use sample_size::{
    sample_size, sample_size_with, FnRelation, SampleSizeSolution, SolverConfig, VarianceRelation,
};
