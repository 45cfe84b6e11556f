//! # Moonpool Dataflow
//!
//! Per-node actor lifecycle and migration orchestration for a distributed
//! dataflow runtime.
//!
//! Actors are typed, stateful units wired to each other through named ports.
//! Each node runs one [`ActorManager`] that creates, restores, destroys and
//! relocates the actors resident on it, and folds the asynchronous replies
//! of its collaborators into exactly one outcome per operation.
//!
//! ## Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ manager      ActorManager: create / restore / destroy       │
//! │              connect (aggregation) / migrate (tombstone)    │
//! ├──────────────┬──────────────┬──────────────┬────────────────┤
//! │ catalog      │ ports        │ registry     │ remote         │
//! │ TypeCatalog  │ PortManager  │ActorRegistry │ RemoteProtocol │
//! │ InMemory…    │ Loopback…    │ InMemory…    │ LocalCluster   │
//! ├──────────────┴──────────────┴──────────────┴────────────────┤
//! │ connection   descriptors, legacy format, AggregationContext │
//! │ actor        ids, lifecycle flag, ports, Actor trait        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use moonpool_dataflow::prelude::*;
//!
//! let catalog = InMemoryCatalog::new();
//! catalog.register(
//!     ActorDescriptor::new("std.Identity", |_| Ok(Box::new(Identity::default())))
//!         .inports(&["token"])
//!         .outports(&["token"]),
//! );
//!
//! let manager = ActorManager::builder(ManagerConfig::for_node("node-1"))
//!     .catalog(Rc::new(catalog))
//!     .build();
//! let id = manager.create("std.Identity", Args::new()).await?;
//! ```
//!
//! ## Execution Model
//!
//! A manager lives on a single-threaded runtime (`current_thread`). Shared
//! state uses `Rc` and `RefCell`, and collaborator traits are
//! `#[async_trait(?Send)]`.

pub mod actor;
pub mod catalog;
pub mod connection;
pub mod error;
pub mod manager;
pub mod ports;
pub mod prelude;
pub mod registry;
pub mod remote;

pub use actor::{Actor, ActorId, ActorState, Args, Capabilities, LifecycleFlag, NodeId, PortId};
pub use connection::{Completion, ConnectionDescriptor, PortConnections, ReplyStatus};
pub use error::{ActorError, PortError, RegistryError, RemoteError};
pub use manager::{ActorManager, ManagerConfig, MigrationPhase, NewActor};
