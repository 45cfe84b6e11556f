//! Port (re)connection driven through the aggregation context.

use super::ActorManager;
use crate::actor::{ActorId, LifecycleFlag};
use crate::connection::{
    wait_terminal, AggregationContext, Completion, ConnectReply, ConnectRequest,
    ConnectionDescriptor,
};
use crate::error::ActorError;

impl ActorManager {
    /// (Re)connect `actor_id`'s ports as described by `descriptors`.
    ///
    /// Resolves to exactly one [`Completion`]: `Ack` when every descriptor
    /// was confirmed, `Nack` as soon as one is refused, when the connect
    /// timeout expires, or when the port manager drops a reply unanswered.
    /// Confirmed peers are recorded on the actor either way; a `Pending`
    /// actor becomes `Enabled` on `Ack`.
    ///
    /// # Errors
    ///
    /// `ActorNotFound` if the actor is not resident. No completion is produced.
    pub async fn connect(
        &self,
        actor_id: &ActorId,
        descriptors: Vec<ConnectionDescriptor>,
    ) -> Result<Completion, ActorError> {
        if !self.is_resident(actor_id) {
            tracing::warn!(actor_id = %actor_id, "connect requested for unknown actor");
            return Err(ActorError::ActorNotFound(actor_id.clone()));
        }
        if descriptors.is_empty() {
            return Ok(Completion::ack(actor_id.clone()));
        }

        let peer_ports = descriptors.iter().map(|d| d.peer_port.clone()).collect();
        let (context, rx) = AggregationContext::new(actor_id.clone(), peer_ports);
        for descriptor in &descriptors {
            let request = ConnectRequest {
                actor_id: actor_id.clone(),
                port_id: descriptor.local_port.clone(),
                peer_node: descriptor.peer_node.clone(),
                peer_port: descriptor.peer_port.clone(),
            };
            tracing::trace!(
                actor_id = %actor_id,
                port = %request.port_id,
                peer_node = %request.peer_node,
                peer_port = %request.peer_port,
                "connect request"
            );
            self.ports
                .connect(request, ConnectReply::new(context.clone(), descriptor.peer_port.clone()));
        }
        // Only the reply sinks keep the context alive from here on.
        drop(context);

        let aggregate = wait_terminal(rx, self.config.connect_timeout()).await;
        tracing::debug!(
            actor_id = %actor_id,
            status = ?aggregate.status,
            confirmed = aggregate.confirmed.len(),
            total = descriptors.len(),
            "connect finished"
        );

        let mut actors = self.actors.borrow_mut();
        let Some(handle) = actors.get_mut(actor_id) else {
            // Destroyed while replies were in flight.
            return Ok(Completion::nack(Some(actor_id.clone())));
        };

        let mut pending: Vec<&ConnectionDescriptor> = descriptors.iter().collect();
        for peer_port in &aggregate.confirmed {
            if let Some(pos) = pending.iter().position(|d| &d.peer_port == peer_port) {
                let descriptor = pending.swap_remove(pos);
                handle
                    .ports_mut()
                    .attach(&descriptor.local_port, descriptor.peer());
            }
        }

        if aggregate.status.is_ack() && handle.flag() == &LifecycleFlag::Pending {
            handle.transition(LifecycleFlag::Enabled)?;
        }

        Ok(Completion {
            status: aggregate.status,
            actor_id: Some(actor_id.clone()),
        })
    }
}
