//! Per-node actor lifecycle orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ ActorManager (one per node)                              │
//! │                                                          │
//! │  actors:     ActorId → ActorHandle    (resident table)   │
//! │  migrations: ActorId → MigrationPhase (in flight)        │
//! ├──────────────┬──────────────┬─────────────┬──────────────┤
//! │ TypeCatalog  │ PortManager  │ActorRegistry│RemoteProtocol│
//! │ (lookup)     │ (wire/unwire)│(publish)    │(remote create│
//! └──────────────┴──────────────┴─────────────┴──────────────┘
//! ```
//!
//! All operations run on the node's single-threaded event loop. The resident
//! table is a `RefCell` that is never borrowed across an `.await`.
//!
//! # Error Contract
//!
//! - create/restore/destroy/queries return `Err(ActorError)`; a failed
//!   creation leaves nothing resident
//! - connect and migrate resolve to a [`Completion`]: `Nack` is a result,
//!   not an error

mod config;
mod connect;
mod migration;

pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use migration::MigrationPhase;

use crate::actor::{
    ActorHandle, ActorId, ActorReport, ActorState, Args, LifecycleFlag, NodeId, PortDirection,
    PortSet,
};
use crate::catalog::{ActorDescriptor, CatalogEntry, InMemoryCatalog, TypeCatalog};
use crate::connection::{Completion, ConnectionDescriptor, PortConnections};
use crate::error::ActorError;
use crate::ports::{LoopbackPortManager, PortManager};
use crate::registry::{ActorRegistry, InMemoryRegistry};
use crate::remote::RemoteProtocol;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Type name reported by [`ActorManager::actor_type_or_sentinel`] for unknown ids.
pub const BAD_ACTOR: &str = "BAD ACTOR";

/// Where a new actor's data comes from.
#[derive(Debug, Clone)]
pub enum ActorSource {
    /// Fresh instance initialized from arguments.
    Args(Args),

    /// Re-instantiation from a snapshot (migration arrival and recovery).
    State(ActorState),
}

/// Connections to establish once a new actor is resident.
#[derive(Debug, Clone)]
pub enum Connections {
    /// Legacy `inports`/`outports` structure, normalized against the local node.
    Legacy(PortConnections),

    /// Already normalized descriptors.
    Descriptors(Vec<ConnectionDescriptor>),
}

/// Full request for [`ActorManager::new_actor`].
///
/// # Example
///
/// ```rust,ignore
/// let request = NewActor::from_state("std.Identity", state)
///     .with_connections(descriptors);
/// let completion = manager.new_actor(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct NewActor {
    actor_type: String,
    source: ActorSource,
    connections: Option<Connections>,
}

impl NewActor {
    pub fn from_args(actor_type: impl Into<String>, args: Args) -> Self {
        Self {
            actor_type: actor_type.into(),
            source: ActorSource::Args(args),
            connections: None,
        }
    }

    pub fn from_state(actor_type: impl Into<String>, state: ActorState) -> Self {
        Self {
            actor_type: actor_type.into(),
            source: ActorSource::State(state),
            connections: None,
        }
    }

    pub fn with_connections(mut self, descriptors: Vec<ConnectionDescriptor>) -> Self {
        self.connections = Some(Connections::Descriptors(descriptors));
        self
    }

    pub fn with_legacy_connections(mut self, connections: PortConnections) -> Self {
        self.connections = Some(Connections::Legacy(connections));
        self
    }
}

/// Owns the actors resident on one node.
pub struct ActorManager {
    config: ManagerConfig,
    catalog: Rc<dyn TypeCatalog>,
    ports: Rc<dyn PortManager>,
    registry: Rc<dyn ActorRegistry>,
    remote: Option<Rc<dyn RemoteProtocol>>,
    actors: RefCell<HashMap<ActorId, ActorHandle>>,
    migrations: RefCell<HashMap<ActorId, MigrationPhase>>,
}

impl std::fmt::Debug for ActorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorManager")
            .field("node_id", self.config.node_id())
            .field("actors", &self.actors.borrow().len())
            .field("migrations", &self.migrations.borrow().len())
            .finish()
    }
}

/// Builder for [`ActorManager`].
///
/// Collaborators default to the in-process implementations; without a
/// remote protocol every migration to another node is refused.
pub struct ActorManagerBuilder {
    config: ManagerConfig,
    catalog: Option<Rc<dyn TypeCatalog>>,
    ports: Option<Rc<dyn PortManager>>,
    registry: Option<Rc<dyn ActorRegistry>>,
    remote: Option<Rc<dyn RemoteProtocol>>,
}

impl ActorManagerBuilder {
    pub fn catalog(mut self, catalog: Rc<dyn TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn ports(mut self, ports: Rc<dyn PortManager>) -> Self {
        self.ports = Some(ports);
        self
    }

    pub fn registry(mut self, registry: Rc<dyn ActorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn remote(mut self, remote: Rc<dyn RemoteProtocol>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Build the manager (infallible).
    pub fn build(self) -> ActorManager {
        let node_id = self.config.node_id().to_string();
        ActorManager {
            config: self.config,
            catalog: self
                .catalog
                .unwrap_or_else(|| Rc::new(InMemoryCatalog::new())),
            ports: self
                .ports
                .unwrap_or_else(|| Rc::new(LoopbackPortManager::new().for_node(node_id))),
            registry: self
                .registry
                .unwrap_or_else(|| Rc::new(InMemoryRegistry::new())),
            remote: self.remote,
            actors: RefCell::new(HashMap::new()),
            migrations: RefCell::new(HashMap::new()),
        }
    }
}

impl ActorManager {
    /// Start building a manager for the node described by `config`.
    pub fn builder(config: ManagerConfig) -> ActorManagerBuilder {
        ActorManagerBuilder {
            config,
            catalog: None,
            ports: None,
            registry: None,
            remote: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        self.config.node_id()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // --- Creation ---

    /// Create an actor from arguments and return its id.
    ///
    /// The optional `name` argument becomes the actor's name and is not
    /// passed to the type's initializer.
    ///
    /// # Errors
    ///
    /// - `TypeNotFound`: unknown or non-primitive type
    /// - `Requirement`: the node lacks a required capability
    /// - `Instantiation` (or the actor's own error): factory or `init` failed
    /// - `Port`: port registration refused
    pub async fn create(&self, actor_type: &str, args: Args) -> Result<ActorId, ActorError> {
        let handle = self.instantiate(actor_type, args)?;
        Ok(self.admit(handle).await)
    }

    /// Re-instantiate an actor from a snapshot and return its (unchanged) id.
    pub async fn restore(&self, actor_type: &str, state: ActorState) -> Result<ActorId, ActorError> {
        let handle = self.instantiate_from_state(actor_type, state)?;
        Ok(self.admit(handle).await)
    }

    /// Create or restore an actor, then reconnect any supplied connections.
    ///
    /// Creation failures are returned as `Err`; the reconnection outcome is
    /// the returned [`Completion`]. Without connections the completion is an
    /// immediate `Ack` carrying the new id.
    pub async fn new_actor(&self, request: NewActor) -> Result<Completion, ActorError> {
        let NewActor {
            actor_type,
            source,
            connections,
        } = request;

        let created = match source {
            ActorSource::Args(args) => self.instantiate(&actor_type, args),
            ActorSource::State(state) => self.instantiate_from_state(&actor_type, state),
        };
        let handle = created.map_err(|e| {
            tracing::error!(actor_type = %actor_type, error = %e, "actor creation failed");
            e
        })?;
        let actor_id = self.admit(handle).await;

        let descriptors = match connections {
            None => Vec::new(),
            Some(Connections::Legacy(legacy)) => legacy.to_descriptors(self.node_id()),
            Some(Connections::Descriptors(descriptors)) => descriptors,
        };
        if descriptors.is_empty() {
            return Ok(Completion::ack(actor_id));
        }
        self.connect(&actor_id, descriptors).await
    }

    fn resolve(&self, actor_type: &str) -> Result<ActorDescriptor, ActorError> {
        match self.catalog.lookup(actor_type) {
            Some(CatalogEntry::Primitive(descriptor)) => Ok(descriptor),
            _ => {
                tracing::error!(actor_type = %actor_type, "requested actor type is not available");
                Err(ActorError::TypeNotFound(actor_type.to_string()))
            }
        }
    }

    /// Build a fully initialized handle; nothing is resident yet.
    fn instantiate(&self, actor_type: &str, mut args: Args) -> Result<ActorHandle, ActorError> {
        let descriptor = self.resolve(actor_type)?;
        let behavior = descriptor.instantiate(self.config.capabilities())?;

        let name = match args.remove("name") {
            Some(Value::String(name)) => name,
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        let ports = PortSet::declare(descriptor.inport_names(), descriptor.outport_names());
        let mut handle = ActorHandle::new(
            ActorId::generate(),
            actor_type.to_string(),
            name,
            ports,
            behavior,
        );

        self.ports.register_ports(&handle)?;
        if let Err(e) = handle.behavior_mut().init(args) {
            self.ports.unregister_ports(&handle);
            return Err(e);
        }
        Ok(handle)
    }

    fn instantiate_from_state(
        &self,
        actor_type: &str,
        state: ActorState,
    ) -> Result<ActorHandle, ActorError> {
        if state.actor_type != actor_type {
            return Err(ActorError::instantiation(
                actor_type,
                format!("snapshot is of type {}", state.actor_type),
            ));
        }
        if self.is_resident(&state.id) {
            return Err(ActorError::AlreadyResident(state.id));
        }

        let descriptor = self.resolve(actor_type)?;
        let mut behavior = descriptor.instantiate(self.config.capabilities())?;

        let ActorState {
            id,
            name,
            mut ports,
            managed,
            ..
        } = state;
        behavior.set_state(managed)?;
        ports.clear_peers();
        ports.ensure_declared(descriptor.inport_names(), descriptor.outport_names());

        let mut handle = ActorHandle::new(id, actor_type.to_string(), name, ports, behavior);
        self.ports.register_ports(&handle)?;
        if let Err(e) = handle.behavior_mut().did_migrate() {
            self.ports.unregister_ports(&handle);
            return Err(e);
        }
        Ok(handle)
    }

    /// Commit a constructed handle to the table and publish its location.
    async fn admit(&self, handle: ActorHandle) -> ActorId {
        let actor_id = handle.id().clone();
        tracing::info!(
            actor_id = %actor_id,
            actor_type = %handle.actor_type(),
            node = %self.node_id(),
            "actor resident"
        );
        self.actors.borrow_mut().insert(actor_id.clone(), handle);

        if let Err(e) = self.registry.publish(&actor_id, self.node_id()).await {
            tracing::warn!(actor_id = %actor_id, error = %e, "failed to publish actor location");
        }
        actor_id
    }

    // --- Destruction ---

    /// Remove an actor from this node.
    ///
    /// Runs the termination hook, unregisters the ports, retracts the
    /// location and drops the handle.
    pub async fn destroy(&self, actor_id: &ActorId) -> Result<(), ActorError> {
        let removed = self.actors.borrow_mut().remove(actor_id);
        let mut handle = removed.ok_or_else(|| ActorError::ActorNotFound(actor_id.clone()))?;

        handle.behavior_mut().will_end();
        self.ports.unregister_ports(&handle);

        if let Err(e) = self.registry.retract(actor_id).await {
            tracing::warn!(actor_id = %actor_id, error = %e, "failed to retract actor location");
        }
        tracing::info!(actor_id = %actor_id, node = %self.node_id(), "actor destroyed");
        Ok(())
    }

    // --- Lifecycle toggles ---

    pub fn enable(&self, actor_id: &ActorId) -> Result<(), ActorError> {
        self.toggle(actor_id, LifecycleFlag::Enabled)
    }

    pub fn disable(&self, actor_id: &ActorId) -> Result<(), ActorError> {
        self.toggle(actor_id, LifecycleFlag::Disabled)
    }

    fn toggle(&self, actor_id: &ActorId, next: LifecycleFlag) -> Result<(), ActorError> {
        self.with_actor_mut(actor_id, |h| {
            if h.flag().migrating_to().is_some() {
                return Err(ActorError::InvalidStateTransition {
                    from: h.flag().clone(),
                    to: next,
                });
            }
            h.transition(next).map(|_| ())
        })?
    }

    // --- Queries ---

    pub fn is_resident(&self, actor_id: &ActorId) -> bool {
        self.actors.borrow().contains_key(actor_id)
    }

    /// Ids of every resident actor, sorted.
    pub fn list_actors(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self.actors.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids of every resident actor allowed to execute, sorted.
    pub fn enabled_actors(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self
            .actors
            .borrow()
            .values()
            .filter(|h| h.flag().is_enabled())
            .map(|h| h.id().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Current wiring, including connections initiated by peers.
    pub fn connections(&self, actor_id: &ActorId) -> Result<PortConnections, ActorError> {
        self.with_actor_mut(actor_id, |h| {
            self.sync_peers(h);
            h.connections()
        })
    }

    /// Adopt the port manager's view of every port it tracks.
    fn sync_peers(&self, handle: &mut ActorHandle) {
        let live: Vec<_> = handle
            .ports()
            .iter()
            .filter_map(|p| self.ports.peers(&p.id).map(|peers| (p.id.clone(), peers)))
            .collect();
        for (port_id, peers) in live {
            handle.ports_mut().replace_peers(&port_id, peers);
        }
    }

    pub fn actor_type(&self, actor_id: &ActorId) -> Result<String, ActorError> {
        self.with_actor(actor_id, |h| h.actor_type().to_string())
    }

    /// Legacy lookup returning [`BAD_ACTOR`] instead of an error.
    pub fn actor_type_or_sentinel(&self, actor_id: &ActorId) -> String {
        self.actor_type(actor_id)
            .unwrap_or_else(|_| BAD_ACTOR.to_string())
    }

    pub fn report(&self, actor_id: &ActorId) -> Result<ActorReport, ActorError> {
        self.with_actor(actor_id, ActorHandle::report)
    }

    pub fn lifecycle(&self, actor_id: &ActorId) -> Result<LifecycleFlag, ActorError> {
        self.with_actor(actor_id, |h| h.flag().clone())
    }

    /// Capture the full state of a resident actor.
    pub fn snapshot(&self, actor_id: &ActorId) -> Result<ActorState, ActorError> {
        self.with_actor(actor_id, ActorHandle::snapshot)
    }

    /// Log the full handle at debug level.
    pub fn dump(&self, actor_id: &ActorId) -> Result<(), ActorError> {
        self.with_actor(actor_id, |h| tracing::debug!(handle = ?h, "actor dump"))
    }

    /// Set a property on a named port.
    ///
    /// Returns `Ok(false)` if the actor has no such port.
    pub fn set_port_property(
        &self,
        actor_id: &ActorId,
        direction: PortDirection,
        port_name: &str,
        property: &str,
        value: Value,
    ) -> Result<bool, ActorError> {
        self.with_actor_mut(actor_id, |h| {
            match h.ports_mut().by_name_mut(direction, port_name) {
                Some(port) => {
                    port.properties.insert(property.to_string(), value);
                    true
                }
                None => false,
            }
        })
    }

    fn with_actor<R>(
        &self,
        actor_id: &ActorId,
        f: impl FnOnce(&ActorHandle) -> R,
    ) -> Result<R, ActorError> {
        let actors = self.actors.borrow();
        let handle = actors
            .get(actor_id)
            .ok_or_else(|| ActorError::ActorNotFound(actor_id.clone()))?;
        Ok(f(handle))
    }

    fn with_actor_mut<R>(
        &self,
        actor_id: &ActorId,
        f: impl FnOnce(&mut ActorHandle) -> R,
    ) -> Result<R, ActorError> {
        let mut actors = self.actors.borrow_mut();
        let handle = actors
            .get_mut(actor_id)
            .ok_or_else(|| ActorError::ActorNotFound(actor_id.clone()))?;
        Ok(f(handle))
    }
}
