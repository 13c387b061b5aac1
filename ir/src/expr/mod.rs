//! Expression trees.
//!
//! - [`core`] - `Expr` node, accessors and structural equality
//! - [`hash_consing`] - process-wide deduplication of structurally identical nodes
//! - [`tree`] - ASCII tree and s-expression rendering

pub mod core;
pub mod hash_consing;
pub mod tree;

pub use core::{Expr, ExprKind};
pub use hash_consing::{gc_dead_refs, live_expr_count};
#[cfg(test)]
pub(crate) use hash_consing::has_cache_entry;
