//! Type catalog trait abstraction.

use crate::actor::{Actor, Capabilities};
use crate::error::ActorError;
use std::fmt;
use std::rc::Rc;

/// Builds a bare actor instance from the node's capabilities.
pub type ActorFactory = Rc<dyn Fn(&Capabilities) -> Result<Box<dyn Actor>, ActorError>>;

/// Everything the manager needs to instantiate a primitive actor type.
///
/// # Example
///
/// ```rust,ignore
/// let identity = ActorDescriptor::new("std.Identity", |_caps| Ok(Box::new(Identity::default())))
///     .inports(&["token"])
///     .outports(&["token"]);
/// catalog.register(identity);
/// ```
#[derive(Clone)]
pub struct ActorDescriptor {
    actor_type: String,
    inports: Vec<String>,
    outports: Vec<String>,
    requires: Vec<String>,
    factory: ActorFactory,
}

impl ActorDescriptor {
    /// Describe a primitive type with no ports and no requirements.
    pub fn new<F>(actor_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Capabilities) -> Result<Box<dyn Actor>, ActorError> + 'static,
    {
        Self {
            actor_type: actor_type.into(),
            inports: Vec::new(),
            outports: Vec::new(),
            requires: Vec::new(),
            factory: Rc::new(factory),
        }
    }

    /// Declare inport names.
    pub fn inports(mut self, names: &[&str]) -> Self {
        self.inports = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Declare outport names.
    pub fn outports(mut self, names: &[&str]) -> Self {
        self.outports = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Declare capabilities the node must provide.
    pub fn requires(mut self, capabilities: &[&str]) -> Self {
        self.requires = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    pub fn inport_names(&self) -> &[String] {
        &self.inports
    }

    pub fn outport_names(&self) -> &[String] {
        &self.outports
    }

    pub fn requirements(&self) -> &[String] {
        &self.requires
    }

    /// Check requirements, then build a bare instance.
    ///
    /// # Errors
    ///
    /// - `ActorError::Requirement` if a required capability is missing
    /// - Whatever the factory returns
    pub fn instantiate(&self, capabilities: &Capabilities) -> Result<Box<dyn Actor>, ActorError> {
        let missing = capabilities.missing(&self.requires);
        if !missing.is_empty() {
            return Err(ActorError::Requirement {
                actor_type: self.actor_type.clone(),
                missing,
            });
        }
        (self.factory)(capabilities)
    }
}

impl fmt::Debug for ActorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorDescriptor")
            .field("actor_type", &self.actor_type)
            .field("inports", &self.inports)
            .field("outports", &self.outports)
            .field("requires", &self.requires)
            .finish()
    }
}

/// Result of a catalog lookup.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    /// Directly instantiable type.
    Primitive(ActorDescriptor),

    /// Known type built from other actors; not instantiable by the manager.
    Composite,
}

/// Resolves actor type names.
///
/// Lookups are immediate; the manager treats `None` and `Composite` alike as
/// an unknown type.
pub trait TypeCatalog {
    /// Look up an actor type by name.
    fn lookup(&self, actor_type: &str) -> Option<CatalogEntry>;
}
