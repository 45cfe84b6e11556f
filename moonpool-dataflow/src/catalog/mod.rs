//! Actor type catalog.
//!
//! - **TypeCatalog**: Trait resolving an actor type name to a catalog entry
//! - **ActorDescriptor**: Ports, requirements and factory of a primitive type
//! - **InMemoryCatalog**: Simple in-process catalog

pub mod memory;
pub mod traits;

pub use memory::InMemoryCatalog;
pub use traits::{ActorDescriptor, ActorFactory, CatalogEntry, TypeCatalog};
