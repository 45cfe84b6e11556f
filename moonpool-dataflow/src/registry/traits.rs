//! Registry trait definitions.

use crate::actor::{ActorId, NodeId};
use crate::error::RegistryError;
use async_trait::async_trait;

/// Registry service for actor location tracking.
///
/// # Consistency Model
///
/// Best-effort from the manager's point of view: publish and retract
/// failures are logged and do not fail the lifecycle operation that issued
/// them.
///
/// # Example
///
/// ```rust,ignore
/// registry.publish(&actor_id, &node_id).await?;
/// assert_eq!(registry.lookup(&actor_id).await?, Some(node_id));
///
/// registry.retract(&actor_id).await?;
/// assert_eq!(registry.lookup(&actor_id).await?, None);
/// ```
#[async_trait(?Send)]
pub trait ActorRegistry {
    /// Record that `actor_id` lives on `node_id`, replacing any previous mapping.
    async fn publish(&self, actor_id: &ActorId, node_id: &NodeId) -> Result<(), RegistryError>;

    /// Remove the mapping for `actor_id`.
    ///
    /// Retracting an unknown actor succeeds (no-op).
    async fn retract(&self, actor_id: &ActorId) -> Result<(), RegistryError>;

    /// Current location of `actor_id`, if published.
    async fn lookup(&self, actor_id: &ActorId) -> Result<Option<NodeId>, RegistryError>;
}
