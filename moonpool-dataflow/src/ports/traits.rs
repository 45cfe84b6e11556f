//! Port manager trait abstraction.

use crate::actor::{ActorHandle, ActorId, Peer, PortId};
use crate::connection::{ConnectReply, ConnectRequest, ReplyStatus};
use crate::error::PortError;
use async_trait::async_trait;

/// Per-node port management.
///
/// # Reply Contract
///
/// - `connect` must eventually consume `reply` with `ack()` or `nack()`,
///   either before returning or later from the event loop
/// - `disconnect` resolves to one aggregate status for all of the actor's ports
/// - `peers` reports wiring made from either end, including connections a
///   peer's node initiated
#[async_trait(?Send)]
pub trait PortManager {
    /// Register every port of a newly constructed actor.
    ///
    /// # Errors
    ///
    /// A failure aborts the creation; nothing is left in the resident table.
    fn register_ports(&self, actor: &ActorHandle) -> Result<(), PortError>;

    /// Forget every port of an actor leaving this node.
    fn unregister_ports(&self, actor: &ActorHandle);

    /// Connect one local port to a peer port.
    fn connect(&self, request: ConnectRequest, reply: ConnectReply);

    /// Disconnect every port of an actor.
    async fn disconnect(&self, actor_id: &ActorId) -> ReplyStatus;

    /// Live peers of a port registered on this node.
    ///
    /// `None` means this port manager does not track wiring; the actor's
    /// record of the connections it confirmed itself is used instead.
    fn peers(&self, _port_id: &PortId) -> Option<Vec<Peer>> {
        None
    }
}
