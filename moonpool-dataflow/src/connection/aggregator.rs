//! Fan-in of per-port connect replies into one terminal outcome.
//!
//! # Architecture
//!
//! ```text
//! ActorManager::connect
//!   1. Create AggregationContext seeded with every descriptor's peer port
//!   2. Hand one ConnectReply per descriptor to the PortManager
//!   3. Drop its own context handle, await the terminal receiver
//!
//! PortManager (any order, any time):
//!   reply.ack() / reply.nack()
//!     → NACK while outstanding: clear outstanding, fire NACK
//!     → remove one occurrence of the peer port
//!     → outstanding now empty: fire ACK
//!
//! Terminal receiver resolves exactly once:
//!   ACK   all descriptors confirmed
//!   NACK  a descriptor was refused, or every reply handle was dropped
//! ```

use crate::actor::{ActorId, NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Status reported by collaborators and by every completing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplyStatus {
    Ack,
    Nack,
}

impl ReplyStatus {
    pub fn is_ack(&self) -> bool {
        matches!(self, ReplyStatus::Ack)
    }
}

/// Outcome of an asynchronous operation, carrying the actor id for correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub status: ReplyStatus,
    pub actor_id: Option<ActorId>,
}

impl Completion {
    pub fn ack(actor_id: ActorId) -> Self {
        Self {
            status: ReplyStatus::Ack,
            actor_id: Some(actor_id),
        }
    }

    pub fn nack(actor_id: Option<ActorId>) -> Self {
        Self {
            status: ReplyStatus::Nack,
            actor_id,
        }
    }

    pub fn is_ack(&self) -> bool {
        self.status.is_ack()
    }
}

/// One port (re)connect request handed to the port manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub actor_id: ActorId,
    pub port_id: PortId,
    pub peer_node: NodeId,
    pub peer_port: PortId,
}

/// Terminal value of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Aggregate {
    pub status: ReplyStatus,
    /// Peer ports acknowledged before the terminal signal fired.
    pub confirmed: Vec<PortId>,
}

/// Shared bookkeeping for one connect fan-out.
///
/// # Invariants
///
/// - The terminal sender is taken on first fire, so the outcome is delivered at most once
/// - `outstanding` is a multiset: two descriptors towards the same peer port
///   need two replies
pub(crate) struct AggregationContext {
    actor_id: ActorId,
    outstanding: RefCell<Vec<PortId>>,
    confirmed: RefCell<Vec<PortId>>,
    terminal: Cell<Option<oneshot::Sender<Aggregate>>>,
}

impl AggregationContext {
    /// Create a context waiting for one reply per entry of `peer_ports`.
    pub(crate) fn new(
        actor_id: ActorId,
        peer_ports: Vec<PortId>,
    ) -> (Rc<Self>, oneshot::Receiver<Aggregate>) {
        let (tx, rx) = oneshot::channel();
        let context = Rc::new(Self {
            actor_id,
            outstanding: RefCell::new(peer_ports),
            confirmed: RefCell::new(Vec::new()),
            terminal: Cell::new(Some(tx)),
        });
        (context, rx)
    }

    fn on_reply(&self, status: ReplyStatus, peer_port: &PortId) {
        if status == ReplyStatus::Nack && !self.outstanding.borrow().is_empty() {
            self.outstanding.borrow_mut().clear();
            tracing::debug!(actor_id = %self.actor_id, peer_port = %peer_port, "port refused connection");
            self.fire(ReplyStatus::Nack);
        }

        let mut outstanding = self.outstanding.borrow_mut();
        if let Some(pos) = outstanding.iter().position(|p| p == peer_port) {
            outstanding.remove(pos);
            if status.is_ack() {
                self.confirmed.borrow_mut().push(peer_port.clone());
            }
            if outstanding.is_empty() {
                drop(outstanding);
                self.fire(ReplyStatus::Ack);
            }
        }
    }

    fn fire(&self, status: ReplyStatus) {
        if let Some(tx) = self.terminal.take() {
            let confirmed = self.confirmed.borrow().clone();
            let _ = tx.send(Aggregate { status, confirmed });
        }
    }

    /// Whether the terminal outcome has already been delivered.
    #[cfg(test)]
    pub(crate) fn is_done(&self) -> bool {
        let sender = self.terminal.take();
        let done = sender.is_none();
        self.terminal.set(sender);
        done
    }
}

impl Drop for AggregationContext {
    // Every reply sink is gone without a terminal signal.
    fn drop(&mut self) {
        self.fire(ReplyStatus::Nack);
    }
}

/// Reply sink for one connect request, tagged with the peer port it targets.
///
/// Consumed by [`ConnectReply::ack`] or [`ConnectReply::nack`]. Dropping it
/// without replying leaves its peer port outstanding.
pub struct ConnectReply {
    context: Rc<AggregationContext>,
    peer_port: PortId,
}

impl ConnectReply {
    pub(crate) fn new(context: Rc<AggregationContext>, peer_port: PortId) -> Self {
        Self { context, peer_port }
    }

    /// The peer port this reply is tagged with.
    pub fn peer_port(&self) -> &PortId {
        &self.peer_port
    }

    pub fn ack(self) {
        self.reply(ReplyStatus::Ack);
    }

    pub fn nack(self) {
        self.reply(ReplyStatus::Nack);
    }

    pub fn reply(self, status: ReplyStatus) {
        self.context.on_reply(status, &self.peer_port);
    }
}

impl std::fmt::Debug for ConnectReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectReply")
            .field("actor_id", &self.context.actor_id)
            .field("peer_port", &self.peer_port)
            .finish()
    }
}

/// Await `future`, giving up after `deadline` when set.
pub(crate) async fn with_deadline<F: Future>(deadline: Option<Duration>, future: F) -> Option<F::Output> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, future).await.ok(),
        None => Some(future.await),
    }
}

/// Wait for the terminal outcome, bounded by `deadline` when set.
///
/// A deadline expiry or a context dropped without a terminal signal both
/// resolve as `Nack`.
pub(crate) async fn wait_terminal(
    rx: oneshot::Receiver<Aggregate>,
    deadline: Option<Duration>,
) -> Aggregate {
    let outcome = with_deadline(deadline, rx).await.and_then(Result::ok);
    outcome.unwrap_or(Aggregate {
        status: ReplyStatus::Nack,
        confirmed: Vec::new(),
    })
}
