//! Connection descriptors and reply aggregation for port (re)wiring.

pub mod aggregator;
pub mod descriptor;

pub(crate) use aggregator::{wait_terminal, with_deadline, AggregationContext};
pub use aggregator::{Completion, ConnectReply, ConnectRequest, ReplyStatus};
pub use descriptor::{descriptors_of, ConnectionDescriptor, PortConnections};
