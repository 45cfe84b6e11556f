//! In-memory registry shared by every node of one process.

use crate::actor::{ActorId, NodeId};
use crate::error::RegistryError;
use crate::registry::traits::ActorRegistry;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Simple in-memory registry.
///
/// Cloning shares the underlying map, so several managers in one process
/// observe the same mappings.
///
/// # Architecture
///
/// ```text
/// ┌───────────────────────────────────────┐
/// │ InMemoryRegistry                      │
/// │  locations: ActorId → NodeId          │  (WHERE actors are)
/// │  node_load: NodeId → usize            │  (HOW MANY per node)
/// │  available: bool                      │  (fault injection)
/// └───────────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    state: Rc<RefCell<RegistryState>>,
}

#[derive(Debug)]
struct RegistryState {
    locations: HashMap<ActorId, NodeId>,
    node_load: HashMap<NodeId, usize>,
    available: bool,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                locations: HashMap::new(),
                node_load: HashMap::new(),
                available: true,
            })),
        }
    }

    /// Make every subsequent call fail with `RegistryError::Unavailable` (or recover).
    pub fn set_available(&self, available: bool) {
        self.state.borrow_mut().available = available;
    }

    /// Number of actors currently published on `node_id`.
    pub fn node_load(&self, node_id: &NodeId) -> usize {
        self.state
            .borrow()
            .node_load
            .get(node_id)
            .copied()
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.state.borrow().available {
            Ok(())
        } else {
            Err(RegistryError::Unavailable)
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryState {
    fn decrement(&mut self, node_id: &NodeId) {
        if let Some(count) = self.node_load.get_mut(node_id) {
            *count = count.saturating_sub(1);
        }
    }
}

#[async_trait(?Send)]
impl ActorRegistry for InMemoryRegistry {
    async fn publish(&self, actor_id: &ActorId, node_id: &NodeId) -> Result<(), RegistryError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();

        if let Some(previous) = state.locations.insert(actor_id.clone(), node_id.clone()) {
            state.decrement(&previous);
        }
        *state.node_load.entry(node_id.clone()).or_insert(0) += 1;

        tracing::debug!(actor_id = %actor_id, node = %node_id, "registry publish");
        Ok(())
    }

    async fn retract(&self, actor_id: &ActorId) -> Result<(), RegistryError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();

        if let Some(previous) = state.locations.remove(actor_id) {
            state.decrement(&previous);
            tracing::debug!(actor_id = %actor_id, node = %previous, "registry retract");
        }
        Ok(())
    }

    async fn lookup(&self, actor_id: &ActorId) -> Result<Option<NodeId>, RegistryError> {
        self.check_available()?;
        Ok(self.state.borrow().locations.get(actor_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_lookup_retract() {
        let registry = InMemoryRegistry::new();
        let actor = ActorId::from("a1");
        let node = NodeId::from("node-1");

        assert_eq!(registry.lookup(&actor).await.unwrap(), None);

        registry.publish(&actor, &node).await.unwrap();
        assert_eq!(registry.lookup(&actor).await.unwrap(), Some(node.clone()));
        assert_eq!(registry.node_load(&node), 1);

        registry.retract(&actor).await.unwrap();
        assert_eq!(registry.lookup(&actor).await.unwrap(), None);
        assert_eq!(registry.node_load(&node), 0);

        // Idempotent
        registry.retract(&actor).await.unwrap();
    }

    #[tokio::test]
    async fn test_republish_moves_load() {
        let registry = InMemoryRegistry::new();
        let actor = ActorId::from("a1");
        let (n1, n2) = (NodeId::from("node-1"), NodeId::from("node-2"));

        registry.publish(&actor, &n1).await.unwrap();
        registry.publish(&actor, &n2).await.unwrap();

        assert_eq!(registry.node_load(&n1), 0);
        assert_eq!(registry.node_load(&n2), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let registry = InMemoryRegistry::new();
        let other = registry.clone();
        let actor = ActorId::from("a1");

        registry.publish(&actor, &"node-1".into()).await.unwrap();
        assert_eq!(
            other.lookup(&actor).await.unwrap(),
            Some(NodeId::from("node-1"))
        );
    }

    #[tokio::test]
    async fn test_unavailable() {
        let registry = InMemoryRegistry::new();
        registry.set_available(false);

        let err = registry
            .publish(&ActorId::from("a1"), &"node-1".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unavailable));
    }
}
