//! Identifier types for actors, nodes and ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an actor instance.
///
/// Assigned once at creation and stable across migration: a snapshot carries
/// the id and the destination node restores the actor under the same id.
///
/// # Example
///
/// ```rust
/// use moonpool_dataflow::actor::ActorId;
///
/// let fresh = ActorId::generate();
/// let known = ActorId::from("5f1c4e1a-actor");
/// assert_ne!(fresh, known);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Generate a fresh, random actor id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a runtime node.
///
/// Opaque to the manager: it is only compared for equality (local vs remote)
/// and handed to the registry and remote protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a single port, unique across the runtime.
///
/// Port ids survive migration so that peers can re-wire to the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    /// Generate a fresh, random port id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ActorId::generate();
        let b = ActorId::generate();
        assert_ne!(a, b);
        assert_ne!(PortId::generate(), PortId::generate());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = ActorId::from("a1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1\"");

        let node: NodeId = serde_json::from_str("\"node-1\"").unwrap();
        assert_eq!(node, NodeId::new("node-1"));
        assert_eq!(node.to_string(), "node-1");
    }
}
