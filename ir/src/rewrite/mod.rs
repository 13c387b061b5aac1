//! Rule-set normalization with fixed-point iteration.
//!
//! This module implements the bottom-up driver that applies rule sets to
//! expression trees until no rule fires anywhere.

pub mod config;
pub mod engine;

pub use config::NormalizeConfig;
pub use engine::{
    NormalizeStats, Normalizer, RuleSet, normalize, normalize_pipeline, try_normalize, try_normalize_pipeline,
};
