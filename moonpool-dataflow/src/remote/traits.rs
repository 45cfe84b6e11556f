//! Remote protocol trait definitions.

use crate::actor::{ActorState, NodeId};
use crate::connection::{Completion, ConnectionDescriptor};
use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request asking a destination node to recreate an actor from its snapshot.
///
/// `connections` are the descriptors captured on the source node before
/// disconnection; the destination re-wires them after restoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCreate {
    pub actor_type: String,
    pub state: ActorState,
    pub connections: Vec<ConnectionDescriptor>,
}

/// Transport towards other nodes' actor managers.
#[async_trait(?Send)]
pub trait RemoteProtocol {
    /// Ask `node_id` to restore an actor and reconnect its ports.
    ///
    /// # Returns
    ///
    /// - `Ok(completion)`: The destination's own restore-and-reconnect outcome
    /// - `Err(RemoteError)`: The request never reached the destination
    async fn create_actor(
        &self,
        node_id: &NodeId,
        request: RemoteCreate,
    ) -> Result<Completion, RemoteError>;
}
