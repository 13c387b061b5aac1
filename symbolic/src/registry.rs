//! The standard symbol table.

use kestrel_ir::{Expr, ExecHandle, Registry, RegistryBuilder, SymbolProps};
use tracing::debug;

use crate::error::Result;
use crate::exec::{self, NumericFn};
use crate::extractors::{self, NEG};

/// Commutative, associative operator with an identity and a fold.
fn monoid(identity: i64, fold: exec::FoldFn) -> SymbolProps {
    SymbolProps::builder()
        .commutative(true)
        .associative(true)
        .identity(Expr::int(identity))
        .exec(ExecHandle::new(NumericFn::Fold(fold)))
        .build()
}

fn unary(f: exec::MapFn) -> SymbolProps {
    SymbolProps::builder().exec(ExecHandle::new(NumericFn::Unary(f))).build()
}

/// Builder preloaded with the standard symbols and extractors, for callers
/// that register more before building.
///
/// | Symbol | Properties | Exec |
/// |--------|------------|------|
/// | `+` | commutative, associative, identity `0` | add |
/// | `*` | commutative, associative, identity `1` | multiply |
/// | `-` | positional | negate |
/// | `°` | positional | none |
/// | `inc` | positional | increment |
/// | `sin` | positional | sine |
///
/// Each standard extractor is also registered as an extractor-backed symbol.
pub fn standard_builder() -> Result<RegistryBuilder> {
    let mut builder = Registry::builder()
        .define_symbol("+", monoid(0, exec::add))?
        .define_symbol("*", monoid(1, exec::mul))?
        .define_symbol(NEG, unary(exec::neg))?
        .define_symbol("°", SymbolProps::fixed())?
        .define_symbol("inc", unary(exec::inc))?
        .define_symbol("sin", unary(exec::sin))?;
    for extractor in extractors::standard_extractors() {
        builder = builder.define_extractor_symbol(extractor)?;
    }
    Ok(builder)
}

pub fn standard_registry() -> Result<Registry> {
    let registry = standard_builder()?.build();
    debug!(symbols = registry.symbols().len(), extractors = registry.extractors().len(), "standard registry built");
    Ok(registry)
}
