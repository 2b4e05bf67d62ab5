//! Lock-free pool of pending article identifiers
//!
//! Seeded once before any connection starts; nothing is ever pushed
//! afterwards, so consumers only race on `pop`. Uses crossbeam's `SegQueue`
//! for lock-free operations.

use crate::types::MessageId;
use crossbeam::queue::SegQueue;

/// Shared pool of message-ids still waiting to be checked
///
/// `take` hands out each id exactly once across all connections; ids are
/// never reinserted (a connection that dies mid-check drops its id).
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: SegQueue<MessageId>,
}

impl WorkQueue {
    pub fn new(articles: impl IntoIterator<Item = MessageId>) -> Self {
        let pending = SegQueue::new();
        for id in articles {
            pending.push(id);
        }
        Self { pending }
    }

    /// Atomically take the next pending id, or `None` once exhausted
    ///
    /// Never blocks.
    pub fn take(&self) -> Option<MessageId> {
        self.pending.pop()
    }

    /// Number of ids not yet handed out
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}
