//! Expression trees and rule-based rewriting.
//!
//! This crate defines the expression model and the rewriting core built on
//! top of it: semantic pattern matching, guarded rules and the bottom-up
//! normalizer.
//!
//! # Module Organization
//!
//! - [`types`] - Literal values (`ConstValue`, `Matrix`)
//! - [`symbol`] - Operator symbols and their properties
//! - [`expr`] - Hash-consed `Expr` nodes
//! - [`registry`] - Symbol and extractor registries
//! - [`pattern`] - Patterns, substitutions, extractors and the matcher
//! - [`rule`] - Rule construction and single-rule application
//! - [`rewrite`] - Rule sets and the normalizer
//! - [`error`] - Error types and result handling

pub mod error;
pub mod expr;
pub mod prelude;
pub mod registry;
pub mod symbol;
pub mod types;

pub mod pattern;
pub mod rewrite;
pub mod rule;


pub use error::{Error, Result};
pub use expr::{Expr, ExprKind, gc_dead_refs, live_expr_count};
pub use registry::{ExtractorRegistry, Registry, RegistryBuilder};
pub use symbol::{ExecHandle, MatcherClass, Operator, Symbol, SymbolProps, SymbolResolver, SymbolTable};
pub use types::{ConstValue, Matrix};

pub use pattern::{Extractor, Matches, Pattern, PatternSpec, Substitution, match_pattern, unify};
pub use rewrite::{
    NormalizeConfig, NormalizeStats, Normalizer, RuleSet, normalize, normalize_pipeline, try_normalize,
    try_normalize_pipeline,
};
pub use rule::{GuardSpec, Rule, TransformSpec, apply_rule, define_rule};
