//! Inter-node protocol collaborator used by migration.

pub mod cluster;
pub mod traits;

pub use cluster::LocalCluster;
pub use traits::{RemoteCreate, RemoteProtocol};
