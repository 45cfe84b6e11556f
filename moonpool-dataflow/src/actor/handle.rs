//! In-memory record of a resident actor and its serializable snapshot.

use crate::actor::{Actor, ActorId, LifecycleFlag, PortSet};
use crate::connection::PortConnections;
use crate::error::ActorError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Serializable snapshot of an actor.
///
/// Sufficient to rebuild the actor on any node: identity, type, name, port
/// ids and properties, and the type-specific `managed` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    pub actor_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub ports: PortSet,
    #[serde(default)]
    pub managed: Value,
}

/// Diagnostic view returned by the `report` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorReport {
    pub id: ActorId,
    pub actor_type: String,
    pub name: String,
    pub flag: LifecycleFlag,
    pub details: Value,
}

/// A fully constructed actor resident on this node.
///
/// Only the [`ActorManager`](crate::manager::ActorManager) creates handles,
/// and only after ports are declared and the behaviour is initialized, so a
/// handle in the resident table is always complete.
pub struct ActorHandle {
    id: ActorId,
    actor_type: String,
    name: String,
    flag: LifecycleFlag,
    ports: PortSet,
    behavior: Box<dyn Actor>,
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("actor_type", &self.actor_type)
            .field("name", &self.name)
            .field("flag", &self.flag)
            .field("ports", &self.ports)
            .finish()
    }
}

impl ActorHandle {
    pub(crate) fn new(
        id: ActorId,
        actor_type: String,
        name: String,
        ports: PortSet,
        behavior: Box<dyn Actor>,
    ) -> Self {
        Self {
            id,
            actor_type,
            name,
            flag: LifecycleFlag::Pending,
            ports,
            behavior,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag(&self) -> &LifecycleFlag {
        &self.flag
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    pub(crate) fn ports_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn Actor {
        self.behavior.as_mut()
    }

    /// Move to `next`, returning the previous flag.
    pub(crate) fn transition(&mut self, next: LifecycleFlag) -> Result<LifecycleFlag, ActorError> {
        if !self.flag.can_transition_to(&next) {
            return Err(ActorError::InvalidStateTransition {
                from: self.flag.clone(),
                to: next,
            });
        }
        Ok(std::mem::replace(&mut self.flag, next))
    }

    /// Current wiring in the legacy `inports`/`outports` form.
    pub fn connections(&self) -> PortConnections {
        PortConnections::of(self)
    }

    /// Capture a full snapshot of this actor.
    pub fn snapshot(&self) -> ActorState {
        ActorState {
            id: self.id.clone(),
            actor_type: self.actor_type.clone(),
            name: self.name.clone(),
            ports: self.ports.clone(),
            managed: self.behavior.state(),
        }
    }

    pub fn report(&self) -> ActorReport {
        ActorReport {
            id: self.id.clone(),
            actor_type: self.actor_type.clone(),
            name: self.name.clone(),
            flag: self.flag.clone(),
            details: self.behavior.report(),
        }
    }
}
