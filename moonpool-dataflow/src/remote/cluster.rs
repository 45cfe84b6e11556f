//! In-process routing between actor managers.

use crate::actor::NodeId;
use crate::connection::Completion;
use crate::error::RemoteError;
use crate::manager::ActorManager;
use crate::remote::traits::{RemoteCreate, RemoteProtocol};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

/// Routes remote requests to managers living in the same process.
///
/// Managers are held weakly: the cluster is shared by every manager through
/// its `remote` slot, and a strong reference would form a cycle.
///
/// # Example
///
/// ```rust,ignore
/// let cluster = Rc::new(LocalCluster::new());
/// let node_a = Rc::new(ActorManager::builder(ManagerConfig::for_node("a"))
///     .remote(cluster.clone())
///     .build());
/// cluster.join(&node_a);
/// ```
#[derive(Debug, Default)]
pub struct LocalCluster {
    members: RefCell<HashMap<NodeId, Weak<ActorManager>>>,
    partitioned: RefCell<HashSet<NodeId>>,
}

impl LocalCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `manager` reachable under its node id.
    pub fn join(&self, manager: &Rc<ActorManager>) {
        let node_id = manager.node_id().clone();
        tracing::debug!(node = %node_id, "node joined local cluster");
        self.members
            .borrow_mut()
            .insert(node_id, Rc::downgrade(manager));
    }

    /// Make `node_id` unreachable until [`LocalCluster::heal`].
    pub fn partition(&self, node_id: &NodeId) {
        self.partitioned.borrow_mut().insert(node_id.clone());
    }

    pub fn heal(&self, node_id: &NodeId) {
        self.partitioned.borrow_mut().remove(node_id);
    }

    fn route(&self, node_id: &NodeId) -> Option<Rc<ActorManager>> {
        if self.partitioned.borrow().contains(node_id) {
            return None;
        }
        self.members.borrow().get(node_id).and_then(Weak::upgrade)
    }
}

#[async_trait(?Send)]
impl RemoteProtocol for LocalCluster {
    async fn create_actor(
        &self,
        node_id: &NodeId,
        request: RemoteCreate,
    ) -> Result<Completion, RemoteError> {
        let target = self
            .route(node_id)
            .ok_or_else(|| RemoteError::NodeUnavailable(node_id.clone()))?;
        Ok(target.handle_remote_create(request).await)
    }
}
