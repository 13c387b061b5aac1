//! Standard algebra on top of `kestrel-ir`.
//!
//! Provides what a consumer of the rewriting core brings along: a symbol
//! table with algebraic properties and numeric semantics, the standard
//! extractors and the rule sets built from them.
//!
//! ```rust,ignore
//! use kestrel_symbolic::{standard_registry, rules};
//!
//! let registry = standard_registry()?;
//! let simplify = rules::simplify(&registry)?;
//! let e = registry.apply("+", [Expr::int(2), Expr::variable("x"), Expr::int(0), Expr::int(3)])?;
//! assert_eq!(kestrel_ir::normalize(&simplify, &e).to_string(), "(+ 5 x)");
//! ```

pub mod error;
pub mod exec;
pub mod extractors;
pub mod registry;
pub mod rules;


pub use error::{Error, Result};
pub use exec::NumericFn;
pub use registry::{standard_builder, standard_registry};
