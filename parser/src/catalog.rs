//! FILENAME: parser/src/catalog.rs
//! PURPOSE: Case-insensitive registry of named operations and constants.
//! CONTEXT: The lexer classifies tokens against a catalog and the parser binds
//! Function and Constant nodes through it. A catalog is assembled once and
//! then only read, so one instance can be shared by any number of threads.

use crate::operation::Operation;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A named numeric constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub value: f64,
}

#[derive(Default)]
pub struct OperationCatalog {
    /// Keyed by lowercase name.
    operations: FxHashMap<String, Arc<dyn Operation>>,
    constants: FxHashMap<String, Constant>,
}

impl OperationCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation, replacing any operation with the same name.
    pub fn with_operation(mut self, operation: impl Operation + 'static) -> Self {
        self.register(Arc::new(operation));
        self
    }

    /// Adds a constant, replacing any constant with the same name.
    pub fn with_constant(mut self, name: &str, value: f64) -> Self {
        self.constants.insert(
            name.to_lowercase(),
            Constant {
                name: name.to_string(),
                value,
            },
        );
        self
    }

    pub fn register(&mut self, operation: Arc<dyn Operation>) {
        self.operations
            .insert(operation.name().to_lowercase(), operation);
    }

    pub fn operation(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.operations.get(&name.to_lowercase())
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.get(&name.to_lowercase())
    }

    /// Operation names, sorted.
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.values().map(|op| op.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn constant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constants.values().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for OperationCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCatalog")
            .field("operations", &self.operation_names())
            .field("constants", &self.constant_names())
            .finish()
    }
}
