//! Per-node configuration for [`ActorManager`](super::ActorManager).

use crate::actor::{Capabilities, NodeId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-node configuration for an [`ActorManager`](super::ActorManager).
///
/// Every timeout is optional; `None` waits for the collaborator indefinitely.
///
/// # Example
///
/// ```rust
/// use moonpool_dataflow::manager::ManagerConfig;
/// use std::time::Duration;
///
/// // Defaults: node "local", no capabilities, no timeouts
/// let config = ManagerConfig::default();
/// assert_eq!(config.node_id().as_str(), "local");
///
/// // Full control via builder
/// let config = ManagerConfig::builder()
///     .node_id("node-1")
///     .capability("io.stdout")
///     .connect_timeout(Duration::from_secs(5))
///     .build();
/// assert!(config.capabilities().provides("io.stdout"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    node_id: NodeId,
    capabilities: Capabilities,
    connect_timeout: Option<Duration>,
    disconnect_timeout: Option<Duration>,
    migration_timeout: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            node_id: NodeId::from("local"),
            capabilities: Capabilities::default(),
            connect_timeout: None,
            disconnect_timeout: None,
            migration_timeout: None,
        }
    }
}

impl ManagerConfig {
    /// Create a config with only the node id set.
    pub fn for_node(node_id: impl Into<String>) -> Self {
        Self {
            node_id: NodeId::new(node_id),
            ..Self::default()
        }
    }

    /// Start building a configuration.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Capabilities offered to hosted actors.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Bound on one connect aggregation.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Bound on the disconnect step of a migration.
    pub fn disconnect_timeout(&self) -> Option<Duration> {
        self.disconnect_timeout
    }

    /// Bound on the remote recreation step of a migration.
    pub fn migration_timeout(&self) -> Option<Duration> {
        self.migration_timeout
    }
}

/// Builder for [`ManagerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    pub fn node_id(mut self, node_id: impl Into<String>) -> Self {
        self.config.node_id = NodeId::new(node_id);
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.config.capabilities = self.config.capabilities.with(capability);
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.config.disconnect_timeout = Some(timeout);
        self
    }

    pub fn migration_timeout(mut self, timeout: Duration) -> Self {
        self.config.migration_timeout = Some(timeout);
        self
    }

    /// Build the configuration (infallible).
    pub fn build(self) -> ManagerConfig {
        self.config
    }
}
