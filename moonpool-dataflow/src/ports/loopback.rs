//! Port manager that wires ports in-process.

use crate::actor::{ActorHandle, ActorId, NodeId, Peer, PortDirection, PortId};
use crate::connection::{ConnectReply, ConnectRequest, ReplyStatus};
use crate::error::PortError;
use crate::ports::traits::PortManager;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// In-process port manager.
///
/// Suitable for single-process deployments and tests: connections are
/// acknowledged immediately when the local port is registered on this node,
/// unless the peer port has been marked as refusing.
///
/// Handles created with [`LoopbackPortManager::for_node`] share one fabric,
/// so a connection made from one side is visible from the other when both
/// ports live in the same process.
///
/// # Architecture
///
/// ```text
/// ┌────────────────────────────────────────────┐
/// │ Fabric (shared)                            │
/// │  ports: PortId → (node, actor, direction)  │
/// │  links: PortId → [Peer]                    │  both ends recorded
/// ├─────────────────────┬──────────────────────┤
/// │ node-a handle       │ node-b handle        │
/// │  refused, connects  │  refused, connects   │  per node
/// └─────────────────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct LoopbackPortManager {
    node_id: NodeId,
    fabric: Rc<RefCell<Fabric>>,
    refused: Rc<RefCell<HashSet<PortId>>>,
    connects: Rc<RefCell<Vec<ConnectRequest>>>,
}

#[derive(Debug)]
struct Registration {
    node_id: NodeId,
    actor_id: ActorId,
    direction: PortDirection,
}

#[derive(Debug, Default)]
struct Fabric {
    ports: HashMap<PortId, Registration>,
    links: HashMap<PortId, Vec<Peer>>,
}

impl Fabric {
    fn link(&mut self, port_id: &PortId, peer: Peer) {
        let Some(registration) = self.ports.get(port_id) else {
            return;
        };
        let peers = self.links.entry(port_id.clone()).or_default();
        match registration.direction {
            PortDirection::In => *peers = vec![peer],
            PortDirection::Out => {
                if !peers.contains(&peer) {
                    peers.push(peer);
                }
            }
        }
    }

    /// Drop every link from or towards `port_ids`.
    fn unlink(&mut self, port_ids: &HashSet<PortId>) {
        for port_id in port_ids {
            self.links.remove(port_id);
        }
        for peers in self.links.values_mut() {
            peers.retain(|peer| !port_ids.contains(&peer.port_id));
        }
    }

    fn ports_of(&self, node_id: &NodeId, actor_id: &ActorId) -> HashSet<PortId> {
        self.ports
            .iter()
            .filter(|(_, r)| &r.node_id == node_id && &r.actor_id == actor_id)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl Default for LoopbackPortManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackPortManager {
    /// Port manager for a node named `local` on a fresh fabric.
    pub fn new() -> Self {
        Self {
            node_id: NodeId::from("local"),
            fabric: Rc::new(RefCell::new(Fabric::default())),
            refused: Rc::new(RefCell::new(HashSet::new())),
            connects: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Port manager for `node_id` sharing this fabric.
    pub fn for_node(&self, node_id: impl Into<String>) -> Self {
        Self {
            node_id: NodeId::new(node_id),
            fabric: Rc::clone(&self.fabric),
            refused: Rc::new(RefCell::new(HashSet::new())),
            connects: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Refuse every future connection from this node towards `peer_port`.
    pub fn refuse(&self, peer_port: impl Into<PortId>) {
        self.refused.borrow_mut().insert(peer_port.into());
    }

    /// Number of ports belonging to `actor_id` registered on this node.
    pub fn port_count(&self, actor_id: &ActorId) -> usize {
        self.fabric.borrow().ports_of(&self.node_id, actor_id).len()
    }

    /// Every connect request seen by this node so far.
    pub fn connect_requests(&self) -> Vec<ConnectRequest> {
        self.connects.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PortManager for LoopbackPortManager {
    fn register_ports(&self, actor: &ActorHandle) -> Result<(), PortError> {
        let mut fabric = self.fabric.borrow_mut();
        if let Some(port) = actor.ports().iter().find(|p| fabric.ports.contains_key(&p.id)) {
            return Err(PortError::AlreadyRegistered(port.id.to_string()));
        }
        for port in actor.ports().iter() {
            fabric.ports.insert(
                port.id.clone(),
                Registration {
                    node_id: self.node_id.clone(),
                    actor_id: actor.id().clone(),
                    direction: port.direction,
                },
            );
        }
        Ok(())
    }

    fn unregister_ports(&self, actor: &ActorHandle) {
        let mut fabric = self.fabric.borrow_mut();
        let port_ids: HashSet<PortId> = actor.ports().iter().map(|p| p.id.clone()).collect();
        fabric.unlink(&port_ids);
        for port_id in &port_ids {
            fabric.ports.remove(port_id);
        }
    }

    fn connect(&self, request: ConnectRequest, reply: ConnectReply) {
        let accepted = {
            let mut fabric = self.fabric.borrow_mut();
            let local = fabric
                .ports
                .get(&request.port_id)
                .is_some_and(|r| r.node_id == self.node_id);
            let refused = self.refused.borrow().contains(&request.peer_port);

            if local && !refused {
                fabric.link(
                    &request.port_id,
                    Peer::new(request.peer_node.clone(), request.peer_port.clone()),
                );
                let peer_here = fabric
                    .ports
                    .get(&request.peer_port)
                    .is_some_and(|r| r.node_id == request.peer_node);
                if peer_here {
                    fabric.link(
                        &request.peer_port,
                        Peer::new(self.node_id.clone(), request.port_id.clone()),
                    );
                }
            }
            local && !refused
        };
        self.connects.borrow_mut().push(request);

        if accepted {
            reply.ack();
        } else {
            reply.nack();
        }
    }

    async fn disconnect(&self, actor_id: &ActorId) -> ReplyStatus {
        let mut fabric = self.fabric.borrow_mut();
        let port_ids = fabric.ports_of(&self.node_id, actor_id);
        fabric.unlink(&port_ids);
        tracing::trace!(actor_id = %actor_id, node = %self.node_id, ports = port_ids.len(), "loopback disconnect");
        ReplyStatus::Ack
    }

    fn peers(&self, port_id: &PortId) -> Option<Vec<Peer>> {
        let fabric = self.fabric.borrow();
        let registration = fabric.ports.get(port_id)?;
        if registration.node_id != self.node_id {
            return None;
        }
        Some(fabric.links.get(port_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, Args, PortSet};
    use crate::connection::AggregationContext;
    use crate::error::ActorError;
    use serde_json::Value;

    struct Nop;

    impl Actor for Nop {
        fn init(&mut self, _args: Args) -> Result<(), ActorError> {
            Ok(())
        }

        fn state(&self) -> Value {
            Value::Null
        }

        fn set_state(&mut self, _state: Value) -> Result<(), ActorError> {
            Ok(())
        }
    }

    fn handle(id: &str) -> ActorHandle {
        let names = ["token".to_string()];
        ActorHandle::new(
            ActorId::from(id),
            "test.Nop".into(),
            String::new(),
            PortSet::declare(&names, &names),
            Box::new(Nop),
        )
    }

    fn connect(ports: &LoopbackPortManager, actor: &ActorHandle, local: &PortId, peer_node: &str, peer: &PortId) {
        let (context, _rx) = AggregationContext::new(actor.id().clone(), vec![peer.clone()]);
        let request = ConnectRequest {
            actor_id: actor.id().clone(),
            port_id: local.clone(),
            peer_node: peer_node.into(),
            peer_port: peer.clone(),
        };
        ports.connect(request, ConnectReply::new(context, peer.clone()));
    }

    #[tokio::test]
    async fn test_connection_visible_from_both_ends() {
        let fabric = LoopbackPortManager::new();
        let (a, b) = (fabric.for_node("node-a"), fabric.for_node("node-b"));
        let (x, y) = (handle("x"), handle("y"));
        a.register_ports(&x).unwrap();
        b.register_ports(&y).unwrap();

        let x_out = x.ports().outports["token"].id.clone();
        let y_in = y.ports().inports["token"].id.clone();
        connect(&a, &x, &x_out, "node-b", &y_in);

        assert_eq!(a.peers(&x_out), Some(vec![Peer::new("node-b".into(), y_in.clone())]));
        assert_eq!(b.peers(&y_in), Some(vec![Peer::new("node-a".into(), x_out.clone())]));
        // Only the owning node answers for a port.
        assert_eq!(a.peers(&y_in), None);

        b.disconnect(y.id()).await;
        assert_eq!(a.peers(&x_out), Some(Vec::new()));
        assert_eq!(b.peers(&y_in), Some(Vec::new()));
    }

    #[test]
    fn test_register_twice_is_refused() {
        let fabric = LoopbackPortManager::new();
        let x = handle("x");
        fabric.register_ports(&x).unwrap();

        let other = fabric.for_node("node-b");
        assert!(matches!(
            other.register_ports(&x),
            Err(PortError::AlreadyRegistered(_))
        ));

        fabric.unregister_ports(&x);
        assert_eq!(fabric.port_count(x.id()), 0);
        assert!(other.register_ports(&x).is_ok());
        assert_eq!(other.port_count(x.id()), 2);
    }

    #[test]
    fn test_refused_peer_is_not_linked() {
        let ports = LoopbackPortManager::new();
        let x = handle("x");
        ports.register_ports(&x).unwrap();
        ports.refuse("pp1");

        let x_out = x.ports().outports["token"].id.clone();
        connect(&ports, &x, &x_out, "node-b", &PortId::from("pp1"));

        assert_eq!(ports.peers(&x_out), Some(Vec::new()));
        assert_eq!(ports.connect_requests().len(), 1);
    }
}
