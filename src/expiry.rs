//! TTL expiry scheduling.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                        Expiry Scheduling Flow                         │
//! │                                                                       │
//! │   set(path, ttl, data)                                                │
//! │       │                                                               │
//! │       ▼                                                               │
//! │   ExpiryQueue.schedule(Expiration)                                    │
//! │       │  push onto Mutex<BinaryHeap> (min-heap by deadline)           │
//! │       │  notify worker                                                │
//! │       ▼                                                               │
//! │   worker thread ("treecache-expiry")                                  │
//! │       │  sleeps until the earliest deadline (Condvar::wait_until)     │
//! │       │  pops due entries, drops the queue lock, then fires           │
//! │       ▼                                                               │
//! │   parent.expire_child(segment, child identity, generation)            │
//! │       removes the slot ONLY if identity + generation still match      │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One queue and one worker serve the whole tree; every leaf write pushes
//! a one-shot expiration. The worker holds the queue lock and a node lock
//! never at the same time, and only ever one node lock (the parent's),
//! so it cannot deadlock with concurrent tree operations — a `set` and an
//! expiration racing on the same slot simply serialize on the parent's
//! write lock.
//!
//! ## Stale deadlines
//!
//! Superseded expirations are not cancelled, they are invalidated: an
//! entry fires with the node identity and write generation it was
//! scheduled against, and [`Node::expire_child`] refuses to remove a slot
//! whose occupant no longer matches. A key refreshed with a longer ttl
//! therefore survives its original deadline.
//!
//! ## Shutdown
//!
//! [`ExpiryWorker`] joins the thread on drop. Entries still queued are
//! abandoned; their parent handles are `Weak` and the tree is gone.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Instant;

use log::{debug, trace};
use parking_lot::{Condvar, Mutex};

use crate::metrics::OpCounters;
use crate::node::{Node, NodeInner};

/// A scheduled one-shot removal of one child slot.
#[derive(Debug)]
pub(crate) struct Expiration {
    pub(crate) deadline: Instant,
    pub(crate) parent: Weak<NodeInner>,
    pub(crate) segment: String,
    pub(crate) child: Weak<NodeInner>,
    pub(crate) generation: u64,
}

// BinaryHeap is a max-heap; order by reversed deadline for earliest-first.
impl Ord for Expiration {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other.deadline.cmp(&self.deadline)
    }
}

impl PartialOrd for Expiration {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Expiration {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for Expiration {}

/// Shared handle to the deadline queue, cloned into every node.
pub(crate) type ExpiryHandle = Arc<ExpiryQueue>;

#[derive(Debug, Default)]
struct Pending {
    heap: BinaryHeap<Expiration>,
    shutdown: bool,
}

/// Deadline queue shared between writers and the expiry worker.
#[derive(Debug, Default)]
pub(crate) struct ExpiryQueue {
    pending: Mutex<Pending>,
    tick: Condvar,
}

impl ExpiryQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enqueues an expiration and wakes the worker.
    pub(crate) fn schedule(&self, expiration: Expiration) {
        trace!(
            "treecache: scheduled expiry of segment {:?} at {:?} (generation {})",
            expiration.segment,
            expiration.deadline,
            expiration.generation
        );
        self.pending.lock().heap.push(expiration);
        self.tick.notify_one();
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().heap.len()
    }
}

/// Owns the background worker thread; joining it on drop.
#[derive(Debug)]
pub(crate) struct ExpiryWorker {
    queue: ExpiryHandle,
    thread: Option<JoinHandle<()>>,
}

impl ExpiryWorker {
    /// Spawns the worker thread over a fresh queue.
    pub(crate) fn spawn(counters: Arc<OpCounters>) -> Self {
        let queue: ExpiryHandle = Arc::new(ExpiryQueue::new());
        let worker_queue = Arc::clone(&queue);
        let thread = std::thread::spawn(move || run(&worker_queue, &counters));
        debug!("treecache: expiry worker started");
        Self {
            queue,
            thread: Some(thread),
        }
    }

    /// Handle for nodes to schedule against.
    pub(crate) fn handle(&self) -> ExpiryHandle {
        Arc::clone(&self.queue)
    }
}

impl Drop for ExpiryWorker {
    fn drop(&mut self) {
        self.queue.pending.lock().shutdown = true;
        self.queue.tick.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Worker loop: sleep until the earliest deadline, pop due entries, fire.
fn run(queue: &ExpiryQueue, counters: &OpCounters) {
    let mut pending = queue.pending.lock();
    loop {
        if pending.shutdown {
            debug!("treecache: expiry worker shutting down");
            return;
        }
        let next_deadline = pending.heap.peek().map(|entry| entry.deadline);
        match next_deadline {
            None => {
                queue.tick.wait(&mut pending);
            },
            Some(deadline) if deadline <= Instant::now() => {
                if let Some(entry) = pending.heap.pop() {
                    // Fire outside the queue lock so writers never block
                    // on removal work.
                    drop(pending);
                    fire(entry, counters);
                    pending = queue.pending.lock();
                }
            },
            Some(deadline) => {
                queue.tick.wait_until(&mut pending, deadline);
            },
        }
    }
}

/// Removes the scheduled slot if it still holds the scheduled value.
fn fire(entry: Expiration, counters: &OpCounters) {
    let Some(parent) = entry.parent.upgrade() else {
        trace!(
            "treecache: dropping expiry for {:?}, parent is gone",
            entry.segment
        );
        return;
    };
    let parent = Node::from_inner(parent);
    if parent.expire_child(&entry.segment, &entry.child, entry.generation) {
        counters.inc_expiration();
        debug!("treecache: expired segment {:?}", entry.segment);
    } else {
        trace!(
            "treecache: stale expiry for {:?} skipped (slot replaced or refreshed)",
            entry.segment
        );
    }
}
