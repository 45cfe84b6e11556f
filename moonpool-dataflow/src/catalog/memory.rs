//! In-memory type catalog.

use crate::catalog::traits::{ActorDescriptor, CatalogEntry, TypeCatalog};
use std::cell::RefCell;
use std::collections::HashMap;

/// Simple in-process catalog backed by a HashMap.
///
/// Types are registered up front by the embedding runtime (or by tests).
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: RefCell<HashMap<String, CatalogEntry>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a primitive type, replacing any previous entry of that name.
    pub fn register(&self, descriptor: ActorDescriptor) {
        let name = descriptor.actor_type().to_string();
        tracing::debug!(actor_type = %name, "registered actor type");
        self.entries
            .borrow_mut()
            .insert(name, CatalogEntry::Primitive(descriptor));
    }

    /// Register a composite type name.
    pub fn register_composite(&self, actor_type: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(actor_type.into(), CatalogEntry::Composite);
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl TypeCatalog for InMemoryCatalog {
    fn lookup(&self, actor_type: &str) -> Option<CatalogEntry> {
        self.entries.borrow().get(actor_type).cloned()
    }
}
