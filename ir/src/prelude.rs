//! Common imports for writing rules and normalizing expressions.
//!
//! ```rust,ignore
//! use kestrel_ir::prelude::*;
//! ```

// Core types
pub use crate::expr::{Expr, ExprKind};
pub use crate::symbol::{ExecHandle, MatcherClass, Operator, Symbol, SymbolProps, SymbolResolver};
pub use crate::types::{ConstValue, Matrix};

// Registries
pub use crate::registry::{Registry, RegistryBuilder};

// Patterns and rules
pub use crate::pattern::spec::{app, ext, float, ground, int, lit, seq0, seq1, sym, var};
pub use crate::pattern::{Extractor, Pattern, PatternSpec, Substitution, match_pattern};
pub use crate::rule::{GuardSpec, Rule, TransformSpec, apply_rule, define_rule};

// Normalization
pub use crate::rewrite::{NormalizeConfig, RuleSet, normalize, normalize_pipeline, try_normalize};
