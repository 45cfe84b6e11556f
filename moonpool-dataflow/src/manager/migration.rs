//! Migration of a resident actor to another node.
//!
//! # Protocol
//!
//! ```text
//! Active
//!   │ flag := Migrating { destination }, will_migrate()
//!   ↓
//! Disconnecting ──(NACK / timeout)──→ DisconnectFailed  flag restored, NACK
//!   │ ACK
//!   ↓
//! Disconnected → Snapshotted → LocalDestroyed   snapshot + descriptors kept
//!   │                                           as a tombstone
//!   ↓
//! RemoteRequested ──(ACK)──────────────────→ Completed   ACK
//!   │ NACK / transport error / timeout
//!   ↓
//! RolledBack   restored locally from the tombstone, reconnected, NACK
//!              (left Pending unless every port reconnected)
//! ```
//!
//! There is no two-phase commit with the destination: if the remote request
//! times out after the destination already restored the actor, both nodes
//! end up hosting it. Configure `migration_timeout` well above the expected
//! remote restore time.

use super::{ActorManager, NewActor};
use crate::actor::{ActorId, ActorState, LifecycleFlag, NodeId};
use crate::connection::{descriptors_of, with_deadline, Completion, ConnectionDescriptor, ReplyStatus};
use crate::error::ActorError;
use crate::remote::RemoteCreate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of an in-flight migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationPhase {
    Active,
    Disconnecting,
    Disconnected,
    DisconnectFailed,
    Snapshotted,
    LocalDestroyed,
    RemoteRequested,
    Completed,
    RolledBack,
}

impl MigrationPhase {
    /// Whether the migration has reached a final outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MigrationPhase::DisconnectFailed | MigrationPhase::Completed | MigrationPhase::RolledBack
        )
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What survives local destruction until the destination answers.
struct Tombstone {
    actor_type: String,
    state: ActorState,
    connections: Vec<ConnectionDescriptor>,
    flag: LifecycleFlag,
}

impl ActorManager {
    /// Current phase of an in-flight migration of `actor_id`.
    ///
    /// Returns `None` once the migration reached a terminal phase.
    pub fn migration_phase(&self, actor_id: &ActorId) -> Option<MigrationPhase> {
        self.migrations.borrow().get(actor_id).copied()
    }

    fn set_phase(&self, actor_id: &ActorId, phase: MigrationPhase) {
        tracing::debug!(actor_id = %actor_id, node = %self.node_id(), phase = %phase, "migration phase");
        if phase.is_terminal() {
            self.migrations.borrow_mut().remove(actor_id);
        } else {
            self.migrations.borrow_mut().insert(actor_id.clone(), phase);
        }
    }

    /// Move `actor_id` to `destination`.
    ///
    /// # Returns
    ///
    /// - `Ack`: the actor is resident on `destination` (or already was here
    ///   and `destination` is this node)
    /// - `Nack`: the actor is unknown, already migrating, no remote protocol
    ///   is configured, or a step failed; in the last case the actor is
    ///   resident here again
    pub async fn migrate(&self, actor_id: &ActorId, destination: &NodeId) -> Completion {
        let flag = match self.lifecycle(actor_id) {
            Ok(flag) => flag,
            Err(_) => {
                tracing::warn!(actor_id = %actor_id, "migration requested for unknown actor");
                return Completion::nack(Some(actor_id.clone()));
            }
        };
        if destination == self.node_id() {
            tracing::debug!(actor_id = %actor_id, "migration to local node is a no-op");
            return Completion::ack(actor_id.clone());
        }
        if flag.migrating_to().is_some() || self.migration_phase(actor_id).is_some() {
            tracing::warn!(actor_id = %actor_id, "actor is already migrating");
            return Completion::nack(Some(actor_id.clone()));
        }
        let Some(remote) = self.remote.clone() else {
            tracing::warn!(actor_id = %actor_id, destination = %destination, "no remote protocol configured");
            return Completion::nack(Some(actor_id.clone()));
        };

        self.set_phase(actor_id, MigrationPhase::Active);
        let connections = match self.with_actor_mut(actor_id, |h| {
            h.transition(LifecycleFlag::Migrating {
                destination: destination.clone(),
            })?;
            h.behavior_mut().will_migrate();
            self.sync_peers(h);
            Ok::<_, ActorError>(descriptors_of(h, self.node_id()))
        }) {
            Ok(Ok(connections)) => connections,
            Ok(Err(e)) | Err(e) => {
                tracing::warn!(actor_id = %actor_id, error = %e, "cannot start migration");
                self.migrations.borrow_mut().remove(actor_id);
                return Completion::nack(Some(actor_id.clone()));
            }
        };

        tracing::info!(
            actor_id = %actor_id,
            node = %self.node_id(),
            destination = %destination,
            connections = connections.len(),
            "migrating actor"
        );

        self.set_phase(actor_id, MigrationPhase::Disconnecting);
        let status = with_deadline(
            self.config.disconnect_timeout(),
            self.ports.disconnect(actor_id),
        )
        .await
        .unwrap_or(ReplyStatus::Nack);

        if !status.is_ack() {
            tracing::warn!(actor_id = %actor_id, status = ?status, "disconnect failed, migration aborted");
            // Migrating → previous flag is always allowed.
            let _ = self.with_actor_mut(actor_id, |h| h.transition(flag.clone()));
            self.set_phase(actor_id, MigrationPhase::DisconnectFailed);
            return Completion {
                status,
                actor_id: Some(actor_id.clone()),
            };
        }
        self.set_phase(actor_id, MigrationPhase::Disconnected);

        let captured = self.with_actor_mut(actor_id, |h| {
            h.ports_mut().clear_peers();
            (h.actor_type().to_string(), h.snapshot())
        });
        let (actor_type, state) = match captured {
            Ok(captured) => captured,
            Err(_) => {
                tracing::warn!(actor_id = %actor_id, "actor destroyed during disconnect");
                self.set_phase(actor_id, MigrationPhase::DisconnectFailed);
                return Completion::nack(Some(actor_id.clone()));
            }
        };
        self.set_phase(actor_id, MigrationPhase::Snapshotted);

        if let Err(e) = self.destroy(actor_id).await {
            tracing::warn!(actor_id = %actor_id, error = %e, "local destroy failed during migration");
            self.set_phase(actor_id, MigrationPhase::DisconnectFailed);
            return Completion::nack(Some(actor_id.clone()));
        }
        self.set_phase(actor_id, MigrationPhase::LocalDestroyed);

        let tombstone = Tombstone {
            actor_type,
            state,
            connections,
            flag,
        };

        self.set_phase(actor_id, MigrationPhase::RemoteRequested);
        let request = RemoteCreate {
            actor_type: tombstone.actor_type.clone(),
            state: tombstone.state.clone(),
            connections: tombstone.connections.clone(),
        };
        let outcome = with_deadline(
            self.config.migration_timeout(),
            remote.create_actor(destination, request),
        )
        .await;

        match outcome {
            Some(Ok(completion)) if completion.is_ack() => {
                tracing::info!(actor_id = %actor_id, destination = %destination, "migration completed");
                self.set_phase(actor_id, MigrationPhase::Completed);
                Completion::ack(actor_id.clone())
            }
            other => {
                match other {
                    Some(Ok(_)) => {
                        tracing::warn!(actor_id = %actor_id, destination = %destination, "destination refused actor")
                    }
                    Some(Err(e)) => {
                        tracing::warn!(actor_id = %actor_id, destination = %destination, error = %e, "remote create failed")
                    }
                    None => {
                        tracing::warn!(actor_id = %actor_id, destination = %destination, "remote create timed out")
                    }
                }
                self.roll_back(actor_id, tombstone).await;
                self.set_phase(actor_id, MigrationPhase::RolledBack);
                Completion::nack(Some(actor_id.clone()))
            }
        }
    }

    /// Bring a tombstoned actor back to life on this node.
    async fn roll_back(&self, actor_id: &ActorId, tombstone: Tombstone) {
        let Tombstone {
            actor_type,
            state,
            connections,
            flag,
        } = tombstone;

        let request = NewActor::from_state(actor_type, state).with_connections(connections);
        match self.new_actor(request).await {
            Ok(completion) => {
                // Enabled requires full connectivity; a partly wired actor stays Pending.
                let restore = match flag {
                    LifecycleFlag::Enabled => completion.is_ack(),
                    LifecycleFlag::Disabled => true,
                    _ => false,
                };
                if !completion.is_ack() {
                    tracing::warn!(actor_id = %actor_id, "restored actor could not reconnect every port");
                }
                if restore {
                    let _ = self.with_actor_mut(actor_id, |h| h.transition(flag));
                }
                tracing::info!(actor_id = %actor_id, node = %self.node_id(), "migration rolled back");
            }
            Err(e) => {
                tracing::error!(actor_id = %actor_id, error = %e, "rollback failed, actor lost");
            }
        }
    }

    /// Destination side of a migration: restore the actor and re-wire it.
    ///
    /// Descriptors are rebased onto this node. If the restored actor cannot
    /// reconnect every port it is destroyed again before answering `Nack`,
    /// so a rolled back source never races a half-wired copy here.
    pub async fn handle_remote_create(&self, request: RemoteCreate) -> Completion {
        let RemoteCreate {
            actor_type,
            state,
            connections,
        } = request;
        let actor_id = state.id.clone();
        let connections = connections
            .into_iter()
            .map(|d| ConnectionDescriptor {
                local_node: self.node_id().clone(),
                ..d
            })
            .collect();

        tracing::debug!(actor_id = %actor_id, node = %self.node_id(), "remote create requested");
        let request = NewActor::from_state(actor_type, state).with_connections(connections);
        match self.new_actor(request).await {
            Ok(completion) if completion.is_ack() => completion,
            Ok(_) => {
                tracing::warn!(actor_id = %actor_id, "arriving actor failed to reconnect");
                if let Err(e) = self.destroy(&actor_id).await {
                    tracing::warn!(actor_id = %actor_id, error = %e, "cleanup of arriving actor failed");
                }
                Completion::nack(Some(actor_id))
            }
            Err(e) => {
                tracing::warn!(actor_id = %actor_id, error = %e, "arriving actor could not be restored");
                Completion::nack(Some(actor_id))
            }
        }
    }
}
