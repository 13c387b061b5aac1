//! Symbol and extractor registries.
//!
//! A [`Registry`] is assembled once by the construction phase through a
//! [`RegistryBuilder`] and is immutable afterwards. Rules compile their
//! patterns against it; cloning is cheap (two `Arc`s), so tests can build
//! isolated registries without any process-wide state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use snafu::ensure;

use crate::error::{DuplicateExtractorSnafu, DuplicateSymbolSnafu, Result, UnknownSymbolSnafu};
use crate::pattern::Extractor;
use crate::symbol::{Operator, SymbolProps, SymbolResolver, SymbolTable};
use crate::Expr;

/// Name -> extractor lookup.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.get(name)
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    fn insert(&mut self, extractor: Arc<dyn Extractor>) -> bool {
        let name = extractor.name().to_string();
        if self.extractors.contains_key(&name) {
            return false;
        }
        self.extractors.insert(name, extractor);
        true
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ExtractorRegistry").field("extractors", &names).finish()
    }
}

/// Immutable bundle of symbols and extractors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    symbols: Arc<SymbolTable>,
    extractors: Arc<ExtractorRegistry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Resolved operator record for `name`.
    pub fn operator(&self, name: &str) -> Result<Arc<Operator>> {
        self.symbols.resolve(name).ok_or_else(|| UnknownSymbolSnafu { symbol: name }.build())
    }

    pub fn extractor(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(name).cloned()
    }

    /// Build a compound `(name children...)`.
    pub fn apply(&self, name: &str, children: impl IntoIterator<Item = Arc<Expr>>) -> Result<Arc<Expr>> {
        Ok(Expr::compound(&self.operator(name)?, children))
    }
}

impl SymbolResolver for Registry {
    fn resolve(&self, name: &str) -> Option<Arc<Operator>> {
        self.symbols.resolve(name)
    }
}

/// Mutable assembly stage of a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    symbols: SymbolTable,
    extractors: ExtractorRegistry,
}

impl RegistryBuilder {
    /// Register an operator symbol with its properties.
    pub fn define_symbol(mut self, name: &str, props: SymbolProps) -> Result<Self> {
        ensure!(self.symbols.insert(Operator::new(name, props)), DuplicateSymbolSnafu { symbol: name });
        Ok(self)
    }

    /// Register an extractor under its own name.
    pub fn define_extractor(mut self, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let name = extractor.name().to_string();
        ensure!(self.extractors.insert(extractor), DuplicateExtractorSnafu { name });
        Ok(self)
    }

    /// Register an extractor together with an extractor-backed symbol of the
    /// same name, so `(name args...)` in a pattern delegates to it.
    pub fn define_extractor_symbol(self, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let name = extractor.name().to_string();
        self.define_extractor(extractor)?.define_symbol(&name, SymbolProps::extractor_backed())
    }

    pub fn build(self) -> Registry {
        Registry { symbols: Arc::new(self.symbols), extractors: Arc::new(self.extractors) }
    }
}
