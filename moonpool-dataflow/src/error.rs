//! Error types for the actor manager.
//!
//! Creation and restoration failures are returned as [`ActorError`]. Failures
//! while connecting ports or migrating never surface here: they resolve as a
//! `Nack` [`Completion`](crate::connection::Completion) instead.

use crate::actor::{ActorId, LifecycleFlag, NodeId};
use thiserror::Error;

/// Errors raised by actor lifecycle operations.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The requested actor type is unknown or is not a primitive type.
    #[error("Actor type not found: {0}")]
    TypeNotFound(String),

    /// No actor with this id is resident on this node.
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The node does not provide a capability the actor type requires.
    #[error("Actor type {actor_type} requires unavailable capabilities: {missing:?}")]
    Requirement {
        actor_type: String,
        missing: Vec<String>,
    },

    /// Construction or initialization of the actor instance failed.
    #[error("Actor {actor_type} can't be instantiated: {reason}")]
    Instantiation { actor_type: String, reason: String },

    /// An actor with this id is already resident (restoring a duplicate).
    #[error("Actor already resident: {0}")]
    AlreadyResident(ActorId),

    /// The actor is in a lifecycle state that forbids the requested change.
    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: LifecycleFlag,
        to: LifecycleFlag,
    },

    /// A state snapshot could not be encoded or decoded.
    #[error("State error: {0}")]
    State(#[from] serde_json::Error),

    /// Port registration was refused by the port manager.
    #[error("Port error: {0}")]
    Port(#[from] PortError),
}

impl ActorError {
    /// Whether this error belongs to the not-found family (unknown type or id).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActorError::TypeNotFound(_) | ActorError::ActorNotFound(_)
        )
    }

    /// Build an `Instantiation` error; for use by actor factories and `init`.
    pub fn instantiation(actor_type: &str, reason: impl ToString) -> Self {
        ActorError::Instantiation {
            actor_type: actor_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors reported by a [`PortManager`](crate::ports::PortManager).
#[derive(Debug, Clone, Error)]
pub enum PortError {
    /// A port with this id is already registered.
    #[error("Port already registered: {0}")]
    AlreadyRegistered(String),

    /// The port manager refused the operation.
    #[error("Port operation failed: {0}")]
    OperationFailed(String),
}

/// Errors reported by an [`ActorRegistry`](crate::registry::ActorRegistry).
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry backend is unreachable.
    #[error("Registry unavailable")]
    Unavailable,

    /// The registry rejected the operation.
    #[error("Registry operation failed: {0}")]
    OperationFailed(String),
}

/// Errors reported by a [`RemoteProtocol`](crate::remote::RemoteProtocol).
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// No route to the destination node.
    #[error("Node unavailable: {0}")]
    NodeUnavailable(NodeId),

    /// The request could not be delivered.
    #[error("Remote request failed: {0}")]
    RequestFailed(String),
}
