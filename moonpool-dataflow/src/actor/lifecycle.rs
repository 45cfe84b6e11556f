//! Actor lifecycle flag.

use crate::actor::NodeId;
use serde::{Deserialize, Serialize};

/// Lifecycle flag of a resident actor.
///
/// # State Transitions
///
/// ```text
/// Pending ──→ Enabled ⇄ Disabled
///    │           │         │
///    └───────────┴────┬────┘
///                     ↓
///                 Migrating ──→ (previous flag, on abort)
/// ```
///
/// # Invariants
///
/// - A freshly created or restored actor is `Pending` until its ports are wired
/// - `Migrating` always names the destination node
/// - A `Migrating` actor cannot be enabled, disabled or migrated again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleFlag {
    /// Created or restored, ports not yet wired.
    Pending,

    /// Allowed to execute.
    Enabled,

    /// Not allowed to execute.
    Disabled,

    /// A migration to `destination` is in flight.
    Migrating { destination: NodeId },
}

impl LifecycleFlag {
    /// Check if transition to next flag is valid.
    ///
    /// Re-applying the current flag is accepted (idempotent enable/disable),
    /// except for `Migrating`.
    pub fn can_transition_to(&self, next: &LifecycleFlag) -> bool {
        use LifecycleFlag::*;
        match (self, next) {
            (Migrating { .. }, Migrating { .. }) => false,
            (Migrating { .. }, _) => true,
            (_, Migrating { .. }) => true,
            (_, Pending) => false,
            (Pending | Enabled | Disabled, Enabled | Disabled) => true,
        }
    }

    /// Check if the actor may execute.
    pub fn is_enabled(&self) -> bool {
        matches!(self, LifecycleFlag::Enabled)
    }

    /// Destination node if a migration is in flight.
    pub fn migrating_to(&self) -> Option<&NodeId> {
        match self {
            LifecycleFlag::Migrating { destination } => Some(destination),
            _ => None,
        }
    }
}
