//! Actor identity, lifecycle, ports and behaviour.

pub mod handle;
pub mod id;
pub mod lifecycle;
pub mod ports;
pub mod traits;

pub use handle::{ActorHandle, ActorReport, ActorState};
pub use id::{ActorId, NodeId, PortId};
pub use lifecycle::LifecycleFlag;
pub use ports::{Peer, Port, PortDirection, PortSet};
pub use traits::{Actor, Args, Capabilities};
