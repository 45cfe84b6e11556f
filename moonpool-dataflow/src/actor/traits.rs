//! Actor behaviour trait and the values handed to it.

use crate::error::ActorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Initialization arguments for a new actor.
///
/// The optional `name` entry is consumed by the manager and never reaches
/// [`Actor::init`].
pub type Args = Map<String, Value>;

/// Type-specific behaviour of an actor.
///
/// The manager owns lifecycle, ports and identity; an `Actor` implementation
/// only owns its computational state. Hooks are synchronous: they run on the
/// node's event loop between collaborator calls.
///
/// # Lifecycle Hooks
///
/// ```text
/// create:   factory → init(args)
/// restore:  factory → set_state(managed) → did_migrate()
/// migrate:  will_migrate() → state() → will_end()
/// destroy:  will_end()
/// ```
///
/// # Example
///
/// ```rust
/// use moonpool_dataflow::actor::{Actor, Args};
/// use moonpool_dataflow::error::ActorError;
/// use serde_json::{json, Value};
///
/// struct Counter {
///     count: u64,
/// }
///
/// impl Actor for Counter {
///     fn init(&mut self, args: Args) -> Result<(), ActorError> {
///         self.count = args.get("start").and_then(Value::as_u64).unwrap_or(0);
///         Ok(())
///     }
///
///     fn state(&self) -> Value {
///         json!({ "count": self.count })
///     }
///
///     fn set_state(&mut self, state: Value) -> Result<(), ActorError> {
///         self.count = state["count"].as_u64().unwrap_or(0);
///         Ok(())
///     }
/// }
/// ```
pub trait Actor {
    /// Initialize a freshly created actor from its arguments.
    fn init(&mut self, args: Args) -> Result<(), ActorError>;

    /// Serialize the behaviour-relevant internal data.
    fn state(&self) -> Value;

    /// Apply a previously captured [`Actor::state`].
    fn set_state(&mut self, state: Value) -> Result<(), ActorError>;

    /// Called on the destination node after [`Actor::set_state`].
    fn did_migrate(&mut self) -> Result<(), ActorError> {
        Ok(())
    }

    /// Called on the source node before ports are disconnected for migration.
    fn will_migrate(&mut self) {}

    /// Called before the actor is removed from this node.
    fn will_end(&mut self) {}

    /// Free-form diagnostics for the `report` query.
    fn report(&self) -> Value {
        Value::Null
    }
}

/// Capabilities a node offers to the actors it hosts.
///
/// Passed to the actor factory at construction time; requirement checks run
/// against the same set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<String>);

impl Capabilities {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability (builder style).
    pub fn with(mut self, capability: impl Into<String>) -> Self {
        self.0.insert(capability.into());
        self
    }

    /// Check whether a capability is provided.
    pub fn provides(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    /// Requirements from `required` that this set does not provide.
    pub fn missing<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        required
            .into_iter()
            .filter(|r| !self.provides(r))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Capabilities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
