//! Common imports for embedding an actor manager.

pub use crate::actor::{
    Actor, ActorHandle, ActorId, ActorReport, ActorState, Args, Capabilities, LifecycleFlag,
    NodeId, Peer, PortDirection, PortId,
};
pub use crate::catalog::{ActorDescriptor, CatalogEntry, InMemoryCatalog, TypeCatalog};
pub use crate::connection::{
    Completion, ConnectReply, ConnectRequest, ConnectionDescriptor, PortConnections, ReplyStatus,
};
pub use crate::error::{ActorError, PortError, RegistryError, RemoteError};
pub use crate::manager::{
    ActorManager, ActorManagerBuilder, ManagerConfig, ManagerConfigBuilder, MigrationPhase,
    NewActor,
};
pub use crate::ports::{LoopbackPortManager, PortManager};
pub use crate::registry::{ActorRegistry, InMemoryRegistry};
pub use crate::remote::{LocalCluster, RemoteCreate, RemoteProtocol};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use std::rc::Rc;
pub use std::time::Duration;

pub type Result<T> = std::result::Result<T, ActorError>;
