//! FILENAME: engine/src/interpreter.rs
//! PURPOSE: Entry point that turns formula text into CompiledFormula values.
//! CONTEXT: An interpreter bundles an operation catalog with a path-resolver
//! factory. Both are immutable and shared, so one interpreter can serve any
//! number of threads. The default catalog is built once, on first use.

use crate::builtins;
use crate::formula::CompiledFormula;
use charformula_parser::{
    parse, DefaultPathResolverFactory, OperationCatalog, ParseResult, Path, PathResolverFactory,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_CATALOG: Lazy<Arc<OperationCatalog>> =
    Lazy::new(|| Arc::new(builtins::default_catalog()));

/// The shared built-in catalog.
pub fn default_catalog() -> Arc<OperationCatalog> {
    Arc::clone(&DEFAULT_CATALOG)
}

#[derive(Clone)]
pub struct FormulaInterpreter {
    catalog: Arc<OperationCatalog>,
    resolver_factory: Arc<dyn PathResolverFactory>,
}

impl FormulaInterpreter {
    /// Interpreter over the built-in catalog and the default path rules.
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    pub fn with_catalog(catalog: Arc<OperationCatalog>) -> Self {
        FormulaInterpreter {
            catalog,
            resolver_factory: Arc::new(DefaultPathResolverFactory),
        }
    }

    /// Replaces the rules that turn `{...}` text into paths.
    pub fn with_path_resolver_factory(mut self, factory: impl PathResolverFactory + 'static) -> Self {
        self.resolver_factory = Arc::new(factory);
        self
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Parses the formula owned by the characteristic at `owner`.
    /// References resolve relative to the owner's parent.
    pub fn parse(&self, formula: &str, owner: &Path) -> ParseResult<CompiledFormula> {
        let resolver = self.resolver_factory.create(&owner.parent());
        let root = parse(formula, &self.catalog, resolver.as_ref())?;
        log::trace!(target: "FORMULA", "compiled '{}' for {}", formula, owner);
        Ok(CompiledFormula::new(root, formula, owner.clone()))
    }
}

impl Default for FormulaInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormulaInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaInterpreter")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}
