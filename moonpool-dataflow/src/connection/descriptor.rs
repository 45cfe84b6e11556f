//! Connection descriptors and the legacy `inports`/`outports` structure.
//!
//! Two representations describe the same wiring:
//!
//! ```text
//! Legacy (PortConnections):
//!   inports:  { in_port_id  → (peer_node, peer_port) }
//!   outports: { out_port_id → [(peer_node, peer_port), …] }
//!
//! Normalized (ConnectionDescriptor):
//!   (local_node, local_port, peer_node, peer_port)   one per peer
//! ```
//!
//! Reconnection always runs on descriptors; the legacy form is converted with
//! [`PortConnections::to_descriptors`].

use crate::actor::{ActorHandle, ActorId, NodeId, Peer, PortId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One endpoint pairing to (re)establish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub local_node: NodeId,
    pub local_port: PortId,
    pub peer_node: NodeId,
    pub peer_port: PortId,
}

impl ConnectionDescriptor {
    pub fn new(local_node: NodeId, local_port: PortId, peer_node: NodeId, peer_port: PortId) -> Self {
        Self {
            local_node,
            local_port,
            peer_node,
            peer_port,
        }
    }

    /// The remote end of this pairing.
    pub fn peer(&self) -> Peer {
        Peer::new(self.peer_node.clone(), self.peer_port.clone())
    }
}

impl From<(NodeId, PortId, NodeId, PortId)> for ConnectionDescriptor {
    fn from((local_node, local_port, peer_node, peer_port): (NodeId, PortId, NodeId, PortId)) -> Self {
        Self::new(local_node, local_port, peer_node, peer_port)
    }
}

/// Wiring of one actor in the legacy two-part structure.
///
/// Inports without a peer are omitted; outports are listed even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnections {
    pub actor_id: Option<ActorId>,
    #[serde(default)]
    pub actor_name: String,
    #[serde(default)]
    pub inports: BTreeMap<PortId, Peer>,
    #[serde(default)]
    pub outports: BTreeMap<PortId, Vec<Peer>>,
}

impl PortConnections {
    /// Capture the current wiring of a resident actor.
    pub fn of(handle: &ActorHandle) -> Self {
        let ports = handle.ports();
        let inports = ports
            .inports
            .values()
            .filter_map(|p| p.peers().first().map(|peer| (p.id.clone(), peer.clone())))
            .collect();
        let outports = ports
            .outports
            .values()
            .map(|p| (p.id.clone(), p.peers().to_vec()))
            .collect();

        Self {
            actor_id: Some(handle.id().clone()),
            actor_name: handle.name().to_string(),
            inports,
            outports,
        }
    }

    /// Normalize into descriptors whose local end is `local_node`.
    pub fn to_descriptors(&self, local_node: &NodeId) -> Vec<ConnectionDescriptor> {
        let inbound = self.inports.iter();
        let outbound = self
            .outports
            .iter()
            .flat_map(|(port, peers)| peers.iter().map(move |peer| (port, peer)));

        inbound
            .chain(outbound)
            .map(|(port, peer)| {
                ConnectionDescriptor::new(
                    local_node.clone(),
                    port.clone(),
                    peer.node_id.clone(),
                    peer.port_id.clone(),
                )
            })
            .collect()
    }

    /// Number of peer pairings described.
    pub fn len(&self) -> usize {
        self.inports.len() + self.outports.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descriptors for every peer of a resident actor, read straight off its ports.
pub fn descriptors_of(handle: &ActorHandle, local_node: &NodeId) -> Vec<ConnectionDescriptor> {
    handle
        .ports()
        .iter()
        .flat_map(|port| {
            port.peers().iter().map(move |peer| {
                ConnectionDescriptor::new(
                    local_node.clone(),
                    port.id.clone(),
                    peer.node_id.clone(),
                    peer.port_id.clone(),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(node: &str, port: &str) -> Peer {
        Peer::new(node.into(), port.into())
    }

    fn desc(local: &str, port: &str, peer_node: &str, peer_port: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(local.into(), port.into(), peer_node.into(), peer_port.into())
    }

    #[test]
    fn test_legacy_structure_normalizes() {
        let mut legacy = PortConnections::default();
        legacy.inports.insert("in1".into(), peer("n2", "p9"));
        legacy
            .outports
            .insert("out1".into(), vec![peer("n2", "p7"), peer("n3", "p8")]);
        legacy.outports.insert("out2".into(), vec![]);

        let mut descriptors = legacy.to_descriptors(&"n1".into());
        descriptors.sort();

        assert_eq!(legacy.len(), 3);
        assert_eq!(
            descriptors,
            vec![
                desc("n1", "in1", "n2", "p9"),
                desc("n1", "out1", "n2", "p7"),
                desc("n1", "out1", "n3", "p8"),
            ]
        );
    }

    #[test]
    fn test_empty_legacy_structure() {
        let legacy = PortConnections::default();
        assert!(legacy.is_empty());
        assert!(legacy.to_descriptors(&"n1".into()).is_empty());
    }

    #[test]
    fn test_legacy_structure_deserializes_without_optional_fields() {
        let legacy: PortConnections = serde_json::from_str(
            r#"{"inports": {"in1": {"node_id": "n2", "port_id": "p9"}}}"#,
        )
        .unwrap();
        assert_eq!(legacy.inports.len(), 1);
        assert!(legacy.outports.is_empty());
        assert_eq!(legacy.actor_id, None);
    }
}
