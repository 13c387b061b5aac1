//! Pattern matching over expression trees.
//!
//! Patterns are written as [`PatternSpec`] trees (names only), compiled into
//! [`Pattern`]s against a [`Registry`](crate::Registry), and matched lazily:
//! [`match_pattern`] returns an iterator over every substitution under which
//! the pattern fits, in a deterministic enumeration order.
//!
//! Compound patterns match "up to meaning": commutative operators match as
//! multisets, sequence variables absorb runs of children, and extractors
//! replace syntax with a semantic test.

pub mod compile;
pub mod extractor;
pub mod helpers;
pub mod matcher;
pub mod spec;
pub mod substitution;

pub use compile::{CompoundPattern, ExtractPattern, MatchStrategy, Pattern, PatternVars, SeqVar};
pub use extractor::{Extraction, Extractions, Extractor, predicate, relation};
pub use helpers::{is_number, is_one, is_zero, numeric_gt};
pub use matcher::{Matches, match_pattern, unify};
pub use spec::{PatternSpec, SeqMin};
pub use substitution::{Binding, Run, Substitution};
