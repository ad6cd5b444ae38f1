//! Visit-tracked graph identities.
//!
//! Every graph entity embeds a [`NodeCore`] and implements [`Node`] to get:
//!
//! - a numeric id, published once by the graph registry,
//! - a string id made of a per-type prefix and the decimal numeric id,
//! - a visit counter that only ever grows.
//!
//! # Id Lifecycle
//!
//! Ids start unassigned (reading as `0`). The registry assigns the id before
//! the node becomes reachable from its shared maps. After that the id is
//! read-only: assigning the same value again is a no-op, any other value is
//! rejected with [`ModelError::IdAlreadyAssigned`].
//!
//! # Concurrency
//!
//! The id lives in a `OnceLock` and the counter is atomic, so nodes can be
//! shared across explorer threads and visited without an external lock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::ModelError;

/// Capability of anything that can render itself for logs and reports.
///
/// The returned string is never empty for nodes.
pub trait Serializable {
    fn serialize(&self) -> String;
}

/// Identity and visit state shared by every node type.
#[derive(Debug, Default)]
pub struct NodeCore {
    id: OnceLock<u32>,
    visited_count: AtomicU32,
}

impl NodeCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric id, `0` while unassigned.
    #[must_use]
    pub fn idi(&self) -> u32 {
        self.id.get().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.id.get().is_some()
    }

    /// Publish the numeric id.
    ///
    /// `prefix` is only used to describe the node in the error.
    pub fn assign_id(&self, prefix: &str, id: u32) -> Result<(), ModelError> {
        if self.id.set(id).is_ok() {
            return Ok(());
        }
        let current = self.idi();
        if current == id {
            return Ok(());
        }
        warn!(
            "Refusing to reassign node {}{} to id {}",
            prefix, current, id
        );
        Err(ModelError::id_already_assigned(prefix, current, id))
    }

    /// Record one visit and return the new count.
    pub fn record_visit(&self) -> u32 {
        self.visited_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[must_use]
    pub fn visited_count(&self) -> u32 {
        self.visited_count.load(Ordering::Relaxed)
    }
}

/// Capability of a visit-tracked graph entity.
///
/// Implementors only provide [`Node::core`] and, optionally, a type-wide
/// [`Node::id_prefix`].
pub trait Node {
    fn core(&self) -> &NodeCore;

    /// Constant prefix of the string id, fixed per concrete type.
    fn id_prefix(&self) -> &'static str {
        ""
    }

    /// String id: prefix followed by the decimal numeric id.
    fn id(&self) -> String {
        format!("{}{}", self.id_prefix(), self.idi())
    }

    fn idi(&self) -> u32 {
        self.core().idi()
    }

    fn set_id(&self, id: u32) -> Result<(), ModelError> {
        self.core().assign_id(self.id_prefix(), id)
    }

    /// Count a visit.
    ///
    /// The timestamp is accepted for recency-aware schedulers but does not
    /// affect any state today.
    fn visit(&self, _timestamp: i64) {
        let count = self.core().record_visit();
        debug!("visit id:{} times {}", self.id(), count);
    }

    fn is_visited(&self) -> bool {
        self.visited_count() > 0
    }

    fn visited_count(&self) -> u32 {
        self.core().visited_count()
    }
}
