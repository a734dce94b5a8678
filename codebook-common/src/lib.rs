//! # Codebook Common Library
//!
//! Shared code for the codebook toolkit crates including:
//! - Survey data model (value labels, variables, scale analysis records)
//! - Labels-file parsing and stem-and-item reconstruction
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod io;
pub mod labels;
pub mod model;

pub use error::{Error, Result};
pub use model::{
    AnalyzedVariable, Polarity, QuestionLabelSet, ScaleAnalysis, ScaleType, ValueLabel, Variable,
};
