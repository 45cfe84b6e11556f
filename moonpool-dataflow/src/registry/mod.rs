//! Actor-to-node registry collaborator.
//!
//! The registry is the cluster-wide view of which node hosts which actor.
//! The manager publishes on create/restore and retracts on destroy.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRegistry;
pub use traits::ActorRegistry;
