//! Named ports of an actor and their peers.

use crate::actor::{NodeId, PortId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    In,
    Out,
}

/// Remote end of a port connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Peer {
    pub node_id: NodeId,
    pub port_id: PortId,
}

impl Peer {
    pub fn new(node_id: NodeId, port_id: PortId) -> Self {
        Self { node_id, port_id }
    }
}

/// A named endpoint on an actor.
///
/// Inports accept at most one peer, outports fan out to any number. Peers are
/// live wiring and are not part of a state snapshot; ids and properties are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(skip)]
    peers: Vec<Peer>,
}

impl Port {
    fn new(name: &str, direction: PortDirection) -> Self {
        Self {
            id: PortId::generate(),
            name: name.to_string(),
            direction,
            properties: Map::new(),
            peers: Vec::new(),
        }
    }

    /// Currently connected peers.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    fn attach(&mut self, peer: Peer) {
        match self.direction {
            PortDirection::In => self.peers = vec![peer],
            PortDirection::Out => {
                if !self.peers.contains(&peer) {
                    self.peers.push(peer);
                }
            }
        }
    }
}

/// All ports of one actor, keyed by port name per direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortSet {
    pub inports: BTreeMap<String, Port>,
    pub outports: BTreeMap<String, Port>,
}

impl PortSet {
    /// Build a port set with fresh ids for the declared port names.
    pub fn declare<'a>(
        inports: impl IntoIterator<Item = &'a String>,
        outports: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let inports = inports
            .into_iter()
            .map(|name| (name.clone(), Port::new(name, PortDirection::In)))
            .collect();
        let outports = outports
            .into_iter()
            .map(|name| (name.clone(), Port::new(name, PortDirection::Out)))
            .collect();
        Self { inports, outports }
    }

    /// Add fresh ports for declared names missing from this set.
    ///
    /// Used when restoring a snapshot taken before the type declared a port.
    pub fn ensure_declared<'a>(
        &mut self,
        inports: impl IntoIterator<Item = &'a String>,
        outports: impl IntoIterator<Item = &'a String>,
    ) {
        for name in inports {
            self.inports
                .entry(name.clone())
                .or_insert_with(|| Port::new(name, PortDirection::In));
        }
        for name in outports {
            self.outports
                .entry(name.clone())
                .or_insert_with(|| Port::new(name, PortDirection::Out));
        }
    }

    /// Iterate over every port, inports first.
    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.inports.values().chain(self.outports.values())
    }

    /// Find a port by id.
    pub fn get(&self, port_id: &PortId) -> Option<&Port> {
        self.iter().find(|p| &p.id == port_id)
    }

    /// Find a port by direction and name.
    pub fn by_name_mut(&mut self, direction: PortDirection, name: &str) -> Option<&mut Port> {
        match direction {
            PortDirection::In => self.inports.get_mut(name),
            PortDirection::Out => self.outports.get_mut(name),
        }
    }

    /// Record a confirmed connection on the local port with `port_id`.
    ///
    /// Returns `false` if no such port exists.
    pub fn attach(&mut self, port_id: &PortId, peer: Peer) -> bool {
        match self
            .inports
            .values_mut()
            .chain(self.outports.values_mut())
            .find(|p| &p.id == port_id)
        {
            Some(port) => {
                port.attach(peer);
                true
            }
            None => false,
        }
    }

    /// Replace the peers of the local port with `port_id`.
    ///
    /// An inport keeps only the last peer. Returns `false` if no such port exists.
    pub fn replace_peers(&mut self, port_id: &PortId, peers: Vec<Peer>) -> bool {
        match self
            .inports
            .values_mut()
            .chain(self.outports.values_mut())
            .find(|p| &p.id == port_id)
        {
            Some(port) => {
                port.peers.clear();
                for peer in peers {
                    port.attach(peer);
                }
                true
            }
            None => false,
        }
    }

    /// Forget all peers (after a disconnect).
    pub fn clear_peers(&mut self) {
        for port in self.inports.values_mut().chain(self.outports.values_mut()) {
            port.peers.clear();
        }
    }

    /// Total number of ports.
    pub fn len(&self) -> usize {
        self.inports.len() + self.outports.len()
    }

    /// Check if the actor declares no ports.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_declare_assigns_unique_ids() {
        let ports = PortSet::declare(&names(&["token"]), &names(&["token", "copy"]));
        assert_eq!(ports.len(), 3);

        let ids: Vec<_> = ports.iter().map(|p| p.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_eq!(ports.inports["token"].direction, PortDirection::In);
    }

    #[test]
    fn test_inport_keeps_single_peer() {
        let mut ports = PortSet::declare(&names(&["token"]), &names(&[]));
        let id = ports.inports["token"].id.clone();

        assert!(ports.attach(&id, Peer::new("n1".into(), "p1".into())));
        assert!(ports.attach(&id, Peer::new("n2".into(), "p2".into())));
        assert_eq!(
            ports.get(&id).unwrap().peers(),
            &[Peer::new("n2".into(), "p2".into())]
        );
    }

    #[test]
    fn test_outport_fans_out_without_duplicates() {
        let mut ports = PortSet::declare(&names(&[]), &names(&["token"]));
        let id = ports.outports["token"].id.clone();

        ports.attach(&id, Peer::new("n1".into(), "p1".into()));
        ports.attach(&id, Peer::new("n1".into(), "p2".into()));
        ports.attach(&id, Peer::new("n1".into(), "p1".into()));
        assert_eq!(ports.get(&id).unwrap().peers().len(), 2);

        ports.clear_peers();
        assert!(ports.get(&id).unwrap().peers().is_empty());
    }

    #[test]
    fn test_ensure_declared_keeps_existing_ids() {
        let mut ports = PortSet::declare(&names(&["in"]), &names(&[]));
        let id = ports.inports["in"].id.clone();

        ports.ensure_declared(&names(&["in", "extra"]), &names(&["out"]));
        assert_eq!(ports.inports["in"].id, id);
        assert_eq!(ports.len(), 3);
    }

    #[test]
    fn test_replace_peers() {
        let mut ports = PortSet::declare(&names(&["in"]), &names(&["out"]));
        let in_id = ports.inports["in"].id.clone();
        let out_id = ports.outports["out"].id.clone();
        ports.attach(&out_id, Peer::new("stale".into(), "p0".into()));

        let fresh = vec![
            Peer::new("n1".into(), "p1".into()),
            Peer::new("n2".into(), "p2".into()),
        ];
        assert!(ports.replace_peers(&out_id, fresh.clone()));
        assert_eq!(ports.get(&out_id).unwrap().peers(), fresh.as_slice());

        assert!(ports.replace_peers(&in_id, fresh));
        assert_eq!(
            ports.get(&in_id).unwrap().peers(),
            &[Peer::new("n2".into(), "p2".into())]
        );
        assert!(!ports.replace_peers(&"missing".into(), Vec::new()));
    }

    #[test]
    fn test_attach_unknown_port() {
        let mut ports = PortSet::declare(&names(&["in"]), &names(&[]));
        assert!(!ports.attach(&"missing".into(), Peer::new("n".into(), "p".into())));
    }

    #[test]
    fn test_snapshot_drops_peers() {
        let mut ports = PortSet::declare(&names(&["in"]), &names(&[]));
        let id = ports.inports["in"].id.clone();
        ports.attach(&id, Peer::new("n".into(), "p".into()));

        let json = serde_json::to_value(&ports).unwrap();
        let restored: PortSet = serde_json::from_value(json).unwrap();
        assert_eq!(restored.inports["in"].id, id);
        assert!(restored.inports["in"].peers().is_empty());
    }
}
