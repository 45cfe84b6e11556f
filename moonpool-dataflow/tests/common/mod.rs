//! Shared fixtures for the integration tests.
//!
//! - `ScriptedPortManager`: holds connect replies so tests fire ACK/NACK in
//!   any order, with a scripted disconnect outcome
//! - Test actor types and a catalog registering them
//! - Remote protocols that fail or never answer

#![allow(dead_code)]

use async_trait::async_trait;
use moonpool_dataflow::actor::{Actor, ActorHandle, ActorId, Args, Capabilities, NodeId, PortId};
use moonpool_dataflow::catalog::{ActorDescriptor, InMemoryCatalog};
use moonpool_dataflow::connection::{Completion, ConnectReply, ConnectRequest, ReplyStatus};
use moonpool_dataflow::error::{ActorError, PortError, RemoteError};
use moonpool_dataflow::manager::{ActorManager, ManagerConfig};
use moonpool_dataflow::ports::PortManager;
use moonpool_dataflow::registry::InMemoryRegistry;
use moonpool_dataflow::remote::{RemoteCreate, RemoteProtocol};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

// ============================================================================
// Actors
// ============================================================================

/// Hook calls observed across every instance created by one catalog.
pub type Events = Rc<RefCell<Vec<String>>>;

/// Forwards tokens unchanged; records its hooks.
pub struct Identity {
    dump: bool,
    events: Events,
}

impl Actor for Identity {
    fn init(&mut self, args: Args) -> Result<(), ActorError> {
        self.dump = args.get("dump").and_then(Value::as_bool).unwrap_or(false);
        self.events.borrow_mut().push("init".into());
        Ok(())
    }

    fn state(&self) -> Value {
        json!({ "dump": self.dump })
    }

    fn set_state(&mut self, state: Value) -> Result<(), ActorError> {
        self.dump = state["dump"].as_bool().unwrap_or(false);
        Ok(())
    }

    fn did_migrate(&mut self) -> Result<(), ActorError> {
        self.events.borrow_mut().push("did_migrate".into());
        Ok(())
    }

    fn will_migrate(&mut self) {
        self.events.borrow_mut().push("will_migrate".into());
    }

    fn will_end(&mut self) {
        self.events.borrow_mut().push("will_end".into());
    }

    fn report(&self) -> Value {
        json!({ "dump": self.dump })
    }
}

/// Fails in `init`.
pub struct Broken;

impl Actor for Broken {
    fn init(&mut self, _args: Args) -> Result<(), ActorError> {
        Err(ActorError::instantiation("test.Broken", "refusing to start"))
    }

    fn state(&self) -> Value {
        Value::Null
    }

    fn set_state(&mut self, _state: Value) -> Result<(), ActorError> {
        Ok(())
    }
}

/// Catalog with `std.Identity`, `test.Broken`, `test.Camera` (requires
/// `media.camera`) and the composite `std.Composite`.
pub fn catalog(events: &Events) -> Rc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();

    let shared = events.clone();
    catalog.register(
        ActorDescriptor::new("std.Identity", move |_: &Capabilities| {
            Ok(Box::new(Identity {
                dump: false,
                events: shared.clone(),
            }))
        })
        .inports(&["token"])
        .outports(&["token"]),
    );
    catalog.register(ActorDescriptor::new("test.Broken", |_: &Capabilities| {
        Ok(Box::new(Broken))
    }));

    let shared = events.clone();
    catalog.register(
        ActorDescriptor::new("test.Camera", move |_: &Capabilities| {
            Ok(Box::new(Identity {
                dump: false,
                events: shared.clone(),
            }))
        })
        .outports(&["image"])
        .requires(&["media.camera"]),
    );
    catalog.register_composite("std.Composite");
    Rc::new(catalog)
}

pub fn args(value: Value) -> Args {
    match value {
        Value::Object(map) => map,
        _ => Args::new(),
    }
}

// ============================================================================
// Port manager
// ============================================================================

/// Port manager whose replies are driven by the test.
#[derive(Default)]
pub struct ScriptedPortManager {
    registered: RefCell<HashSet<PortId>>,
    replies: RefCell<Vec<ConnectReply>>,
    requests: RefCell<Vec<ConnectRequest>>,
    disconnect_status: Cell<Option<ReplyStatus>>,
    disconnect_delay: Cell<Option<Duration>>,
    disconnects: Cell<usize>,
}

impl ScriptedPortManager {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Take the held reply tagged with `peer_port`.
    pub fn take_reply(&self, peer_port: &str) -> Option<ConnectReply> {
        let mut replies = self.replies.borrow_mut();
        let pos = replies
            .iter()
            .position(|r| r.peer_port().as_str() == peer_port)?;
        Some(replies.remove(pos))
    }

    pub fn held_replies(&self) -> usize {
        self.replies.borrow().len()
    }

    /// Drop every held reply without answering.
    pub fn drop_replies(&self) {
        self.replies.borrow_mut().clear();
    }

    pub fn requests(&self) -> Vec<ConnectRequest> {
        self.requests.borrow().clone()
    }

    pub fn registered_ports(&self) -> usize {
        self.registered.borrow().len()
    }

    pub fn set_disconnect_status(&self, status: ReplyStatus) {
        self.disconnect_status.set(Some(status));
    }

    pub fn set_disconnect_delay(&self, delay: Duration) {
        self.disconnect_delay.set(Some(delay));
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.get()
    }
}

#[async_trait(?Send)]
impl PortManager for ScriptedPortManager {
    fn register_ports(&self, actor: &ActorHandle) -> Result<(), PortError> {
        let mut registered = self.registered.borrow_mut();
        for port in actor.ports().iter() {
            if !registered.insert(port.id.clone()) {
                return Err(PortError::AlreadyRegistered(port.id.to_string()));
            }
        }
        Ok(())
    }

    fn unregister_ports(&self, actor: &ActorHandle) {
        let mut registered = self.registered.borrow_mut();
        for port in actor.ports().iter() {
            registered.remove(&port.id);
        }
    }

    fn connect(&self, request: ConnectRequest, reply: ConnectReply) {
        self.requests.borrow_mut().push(request);
        self.replies.borrow_mut().push(reply);
    }

    async fn disconnect(&self, _actor_id: &ActorId) -> ReplyStatus {
        self.disconnects.set(self.disconnects.get() + 1);
        if let Some(delay) = self.disconnect_delay.get() {
            tokio::time::sleep(delay).await;
        }
        self.disconnect_status.get().unwrap_or(ReplyStatus::Ack)
    }
}

// ============================================================================
// Remote protocols
// ============================================================================

/// Fails every request without reaching any node.
pub struct UnreachableRemote;

#[async_trait(?Send)]
impl RemoteProtocol for UnreachableRemote {
    async fn create_actor(
        &self,
        node_id: &NodeId,
        _request: RemoteCreate,
    ) -> Result<Completion, RemoteError> {
        Err(RemoteError::NodeUnavailable(node_id.clone()))
    }
}

/// Never answers.
pub struct SilentRemote;

#[async_trait(?Send)]
impl RemoteProtocol for SilentRemote {
    async fn create_actor(
        &self,
        _node_id: &NodeId,
        _request: RemoteCreate,
    ) -> Result<Completion, RemoteError> {
        std::future::pending().await
    }
}

// ============================================================================
// Managers
// ============================================================================

/// Manager on `node` with the given port manager and a private registry.
pub fn manager(
    node: &str,
    events: &Events,
    ports: Rc<dyn PortManager>,
) -> (Rc<ActorManager>, InMemoryRegistry) {
    let registry = InMemoryRegistry::new();
    let manager = ActorManager::builder(ManagerConfig::for_node(node))
        .catalog(catalog(events))
        .ports(ports)
        .registry(Rc::new(registry.clone()))
        .build();
    (Rc::new(manager), registry)
}
