//! Tree positions: lazy creation, per-node locking, and mutation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         Node<handle> Layout                          │
//! │                                                                      │
//! │   Node ──► Arc<NodeInner>                                            │
//! │               │                                                      │
//! │               ├── timers: ExpiryHandle      (shared deadline queue)  │
//! │               ├── generation: AtomicU64     (write token, lock-free) │
//! │               └── state: RwLock<NodeState>                           │
//! │                       │                                              │
//! │                       ├── data: Arc<[u8]>        (payload snapshot)  │
//! │                       ├── ttl: Duration          (zero if branch)    │
//! │                       └── children: FxHashMap<String, Node>          │
//! │                                                                      │
//! │   Each node's lock covers ONLY its own fields. Traversal clones the  │
//! │   next child handle under the read lock, drops the guard, then       │
//! │   descends — two node locks are never held at once, so there is no   │
//! │   cross-node deadlock ordering to get wrong.                         │
//! └──────────────────────────────────────────────────────────────────────┘
//!
//! Write Flow (set, path longer than one segment)
//! ──────────────────────────────────────────────
//!
//!   set(["a", "b"], ttl, data) on node N:
//!     1. Build a fresh empty branch
//!     2. Write-lock N, replace slot "a" with it (old subtree discarded
//!        immediately), unlock
//!     3. Recurse set(["b"], ttl, data) into the fresh branch
//!
//! Write Flow (set, single segment)
//! ────────────────────────────────
//!
//!   set(["b"], ttl, data) on node N:
//!     1. Build a fresh value node carrying data + ttl (generation 1)
//!     2. Write-lock N, replace slot "b", unlock
//!     3. Push an expiration {parent: N, segment: "b", child identity,
//!        generation} onto the shared deadline queue
//! ```
//!
//! ## Key Components
//!
//! - [`Node`]: cheap `Clone` handle; all mutation goes through interior
//!   locking, so every operation takes `&self`.
//! - `NodeState`: the lock-guarded fields (payload, ttl, children).
//!
//! ## State Machine
//!
//! A node is either a pure branch (empty payload, zero ttl) or a value
//! holder, and moves between the roles over its lifetime:
//!
//! - branch → value holder: a set terminating at this exact node.
//! - value holder → branch: a set passing *through* this node's slot
//!   replaces the slot wholesale; a set with an empty path on the node
//!   itself overwrites in place and clears its children.
//! - removed: explicit delete of its segment, or its expiration firing.
//!
//! ## Thread Safety
//!
//! `Node` is `Send + Sync`; any number of threads may call any operation
//! concurrently. There is no snapshot isolation across levels: a `get`
//! racing a `set` on an ancestor slot sees either the old or new child.
//!
//! ## Implementation Notes
//!
//! - The children mapping is `rustc_hash::FxHashMap`; segments are opaque
//!   short strings and FxHash beats SipHash for them.
//! - Payloads are `Arc<[u8]>` so `read()` is an O(1) snapshot clone.
//! - `generation` lives outside the lock so the expiry worker can check
//!   staleness while holding only the parent's lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::InvalidPath;
use crate::expiry::{Expiration, ExpiryHandle};
use crate::traits::TreeOps;
use crate::visualize::TreeView;

/// A position in the tree, below the root.
///
/// `Node` is a handle: cloning it is cheap and every clone addresses the
/// same underlying position. A node optionally holds a value (payload +
/// ttl) and owns a mapping from segment to child nodes, guarded by its
/// own reader/writer lock.
///
/// Handles returned by `get` stay valid after the node is removed from
/// its parent; they simply address a detached subtree until dropped.
///
/// # Example
///
/// ```
/// use treecache::{TreeCache, TreeOps};
/// use std::time::Duration;
///
/// let cache = TreeCache::new();
/// cache.set(&["a", "b"], Duration::from_secs(60), b"x").unwrap();
///
/// // "a" was created lazily as a branch.
/// let branch = cache.get(&["a"]).unwrap();
/// assert_eq!(branch.read().len(), 0);
/// assert_eq!(branch.size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

#[derive(Debug)]
pub(crate) struct NodeInner {
    timers: ExpiryHandle,
    generation: AtomicU64,
    state: RwLock<NodeState>,
}

#[derive(Debug)]
struct NodeState {
    data: Arc<[u8]>,
    ttl: Duration,
    children: FxHashMap<String, Node>,
}

fn empty_payload() -> Arc<[u8]> {
    let empty: &[u8] = &[];
    Arc::from(empty)
}

impl Node {
    /// Creates an empty branch node.
    pub(crate) fn branch(timers: ExpiryHandle) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                timers,
                generation: AtomicU64::new(0),
                state: RwLock::new(NodeState {
                    data: empty_payload(),
                    ttl: Duration::ZERO,
                    children: FxHashMap::default(),
                }),
            }),
        }
    }

    /// Creates a fresh value node (generation 1, no children).
    fn with_value(timers: ExpiryHandle, ttl: Duration, data: &[u8]) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                timers,
                generation: AtomicU64::new(1),
                state: RwLock::new(NodeState {
                    data: Arc::from(data),
                    ttl,
                    children: FxHashMap::default(),
                }),
            }),
        }
    }

    /// Rebuilds a handle from the inner allocation (expiry worker path).
    pub(crate) fn from_inner(inner: Arc<NodeInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<NodeInner> {
        Arc::downgrade(&self.inner)
    }

    /// Current write generation of this node's value.
    pub(crate) fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Overwrites this node's value in place.
    ///
    /// Clears the children mapping: a value written at this exact
    /// position discards any subtree previously nested beneath it. Bumps
    /// the write generation, invalidating every expiration scheduled for
    /// an earlier value in this slot. Returns the new generation.
    pub(crate) fn write_value(&self, ttl: Duration, data: &[u8]) -> u64 {
        let mut state = self.inner.state.write();
        state.data = Arc::from(data);
        state.ttl = ttl;
        state.children = FxHashMap::default();
        self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Looks up a direct child, cloning the handle under the read lock.
    fn child(&self, segment: &str) -> Option<Node> {
        self.inner.state.read().children.get(segment).cloned()
    }

    /// Returns the child for `segment`, creating an empty branch if the
    /// slot is vacant. Existing children (and their subtrees) are reused.
    pub(crate) fn ensure_child(&self, segment: &str) -> Node {
        let mut state = self.inner.state.write();
        if let Some(existing) = state.children.get(segment) {
            return existing.clone();
        }
        let child = Node::branch(self.inner.timers.clone());
        state.children.insert(segment.to_string(), child.clone());
        child
    }

    /// Replaces the slot for `segment` unconditionally.
    pub(crate) fn insert_child(&self, segment: &str, child: Node) {
        let mut state = self.inner.state.write();
        state.children.insert(segment.to_string(), child);
    }

    /// Removes the slot for `segment`; absent slots are a no-op.
    pub(crate) fn remove_child(&self, segment: &str) {
        let mut state = self.inner.state.write();
        state.children.remove(segment);
    }

    /// Schedules removal of `child` from this node's mapping after `ttl`.
    pub(crate) fn schedule_removal(
        &self,
        segment: &str,
        child: &Node,
        generation: u64,
        ttl: Duration,
    ) {
        self.inner.timers.schedule(Expiration {
            deadline: Instant::now() + ttl,
            parent: self.downgrade(),
            segment: segment.to_string(),
            child: child.downgrade(),
            generation,
        });
    }

    /// Removes `segment` if the slot still holds the scheduled child at
    /// the scheduled generation. Returns whether an entry was removed.
    ///
    /// Called by the expiry worker with no other lock held. A slot that
    /// was replaced (different node identity) or refreshed (bumped
    /// generation) since scheduling is left untouched — a stale deadline
    /// must never delete a live successor value.
    pub(crate) fn expire_child(
        &self,
        segment: &str,
        child: &Weak<NodeInner>,
        generation: u64,
    ) -> bool {
        let mut state = self.inner.state.write();
        let live = state.children.get(segment).is_some_and(|current| {
            std::ptr::eq(Weak::as_ptr(child), Arc::as_ptr(&current.inner))
                && current.generation() == generation
        });
        if live {
            state.children.remove(segment);
        }
        live
    }

    /// Walks `path` from this node, one read lock at a time.
    fn resolve(&self, path: &[&str]) -> Option<Node> {
        let mut current = self.clone();
        for segment in path {
            current = current.child(segment)?;
        }
        Some(current)
    }
}

impl TreeOps for Node {
    /// Resolves `path` relative to this node.
    ///
    /// An empty path resolves to the node itself — this is how a caller
    /// turns an intermediate path into the node actually holding a value.
    fn get(&self, path: &[&str]) -> Option<Node> {
        self.resolve(path)
    }

    /// Writes a value at `path` relative to this node.
    ///
    /// With an empty path, overwrites this node's own value in place and
    /// discards its children; no removal is scheduled because the node
    /// has no reference to the parent slot holding it. With one segment,
    /// the slot is replaced by a fresh value node and its removal is
    /// scheduled after `ttl`. With more segments, the first slot is
    /// replaced by a fresh empty branch *before* the nested write
    /// completes, discarding whatever subtree lived there.
    fn set(&self, path: &[&str], ttl: Duration, data: &[u8]) -> Result<(), InvalidPath> {
        match path {
            [] => {
                self.write_value(ttl, data);
                Ok(())
            },
            [segment] => {
                let child = Node::with_value(self.inner.timers.clone(), ttl, data);
                let generation = child.generation();
                self.insert_child(segment, child.clone());
                self.schedule_removal(segment, &child, generation, ttl);
                Ok(())
            },
            [segment, rest @ ..] => {
                let child = Node::branch(self.inner.timers.clone());
                self.insert_child(segment, child.clone());
                child.set(rest, ttl, data)
            },
        }
    }

    /// Deletes the entry at `path` relative to this node.
    ///
    /// For longer paths the penultimate node is resolved first; if any
    /// segment on the way is absent the delete is a successful no-op.
    fn delete(&self, path: &[&str]) -> Result<(), InvalidPath> {
        match path {
            [] => Err(InvalidPath),
            [segment] => {
                self.remove_child(segment);
                Ok(())
            },
            [prefix @ .., segment] => {
                if let Some(parent) = self.resolve(prefix) {
                    parent.remove_child(segment);
                }
                Ok(())
            },
        }
    }

    /// Snapshot of the most recently stored payload.
    fn read(&self) -> Arc<[u8]> {
        self.inner.state.read().data.clone()
    }

    /// Own payload length plus the sizes of all children.
    ///
    /// The per-node snapshot (payload length + child handles) is taken
    /// under this node's read lock; the guard is dropped before
    /// descending, so sibling subtrees are never locked together.
    fn size(&self) -> usize {
        let (own, children) = {
            let state = self.inner.state.read();
            let children: Vec<Node> = state.children.values().cloned().collect();
            (state.data.len(), children)
        };
        own + children.iter().map(|child| child.size()).sum::<usize>()
    }

    /// Builds the diagnostic view for this subtree.
    fn visualize(&self) -> TreeView {
        let (own, children) = {
            let state = self.inner.state.read();
            let children: Vec<(String, Node)> = state
                .children
                .iter()
                .map(|(segment, child)| (segment.clone(), child.clone()))
                .collect();
            (state.data.len(), children)
        };

        let mut view = TreeView {
            size: own,
            ..TreeView::default()
        };
        for (segment, child) in children {
            let nested = child.visualize();
            view.size += nested.size;
            view.children.insert(segment, nested);
        }
        view
    }
}
