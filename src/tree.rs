//! The tree root: dispatch entry point and scheduler wiring.
//!
//! [`TreeCache`] anchors the top-level children mapping, owns the expiry
//! worker and the operation counters, and implements the same capability
//! set as every node. It differs from a node in exactly the ways the
//! root must: it is never itself a lookup result, its `read()` is always
//! empty, and an empty path is an [`InvalidPath`] for writes instead of
//! an in-place overwrite.
//!
//! ## Example Usage
//!
//! ```
//! use treecache::{TreeCache, TreeOps};
//! use std::time::Duration;
//!
//! let cache = TreeCache::new();
//! let ttl = Duration::from_secs(60);
//!
//! cache.set(&["users", "alice", "session"], ttl, b"tok-1").unwrap();
//! let node = cache.get(&["users", "alice", "session"]).unwrap();
//! assert_eq!(&*node.read(), b"tok-1");
//!
//! cache.delete(&["users", "alice"]).unwrap();
//! assert!(cache.get(&["users", "alice", "session"]).is_none());
//! ```
//!
//! ## Thread Safety
//!
//! `TreeCache` is `Send + Sync`; wrap it in an `Arc` to share across
//! threads. Operations on unrelated subtrees contend only on the root's
//! own lock, and only for the instant it takes to resolve or create the
//! top-level slot.

use std::sync::Arc;
use std::time::Duration;

use crate::error::InvalidPath;
use crate::expiry::ExpiryWorker;
use crate::metrics::{OpCounters, TreeMetrics};
use crate::node::Node;
use crate::traits::TreeOps;
use crate::visualize::TreeView;

/// Entry point of the hierarchical cache.
///
/// A degenerate node: it carries no value of its own and exists solely to
/// anchor the mapping from top-level segment to child node. Dropping the
/// `TreeCache` discards the whole tree and joins the expiry worker.
///
/// # Example
///
/// ```
/// use treecache::{TreeCache, TreeOps};
/// use std::time::Duration;
///
/// let cache = TreeCache::new();
/// cache.set(&["a"], Duration::from_secs(60), b"123456").unwrap();
/// cache.set(&["b"], Duration::from_secs(60), b"123").unwrap();
///
/// assert_eq!(cache.size(), 9);
/// assert_eq!(cache.read().len(), 0); // the root never holds a value
/// ```
#[derive(Debug)]
pub struct TreeCache {
    root: Node,
    counters: Arc<OpCounters>,
    _worker: ExpiryWorker,
}

impl TreeCache {
    /// Creates an empty tree and starts its expiry worker.
    pub fn new() -> Self {
        let counters = Arc::new(OpCounters::default());
        let worker = ExpiryWorker::spawn(Arc::clone(&counters));
        let root = Node::branch(worker.handle());
        Self {
            root,
            counters,
            _worker: worker,
        }
    }

    /// Snapshot of the operation counters.
    ///
    /// # Example
    ///
    /// ```
    /// use treecache::{TreeCache, TreeOps};
    /// use std::time::Duration;
    ///
    /// let cache = TreeCache::new();
    /// cache.set(&["k"], Duration::from_secs(60), b"v").unwrap();
    /// let _ = cache.get(&["k"]);
    /// let _ = cache.get(&["missing"]);
    ///
    /// let metrics = cache.metrics();
    /// assert_eq!(metrics.sets, 1);
    /// assert_eq!(metrics.hits, 1);
    /// assert_eq!(metrics.misses, 1);
    /// ```
    pub fn metrics(&self) -> TreeMetrics {
        self.counters.snapshot()
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeOps for TreeCache {
    /// Resolves a path to a node. An empty path is absent: the root is
    /// never returned as a lookup result.
    fn get(&self, path: &[&str]) -> Option<Node> {
        self.counters.inc_get();
        let found = if path.is_empty() {
            None
        } else {
            self.root.get(path)
        };
        match found {
            Some(node) => {
                self.counters.inc_hit();
                Some(node)
            },
            None => {
                self.counters.inc_miss();
                None
            },
        }
    }

    /// Writes a value at `path`.
    ///
    /// Unlike a node, a single-segment write at the root refreshes the
    /// existing child in place (creating it if absent) rather than
    /// replacing the slot, and then schedules its removal from the root
    /// mapping after `ttl`. Deeper writes reuse the top-level child and
    /// recurse with node semantics.
    fn set(&self, path: &[&str], ttl: Duration, data: &[u8]) -> Result<(), InvalidPath> {
        match path {
            [] => Err(InvalidPath),
            [segment] => {
                let child = self.root.ensure_child(segment);
                let generation = child.write_value(ttl, data);
                // Reassert the slot: a deadline for the previous value
                // may have fired between ensure and write.
                self.root.insert_child(segment, child.clone());
                self.root.schedule_removal(segment, &child, generation, ttl);
                self.counters.inc_set();
                Ok(())
            },
            [segment, rest @ ..] => {
                let child = self.root.ensure_child(segment);
                child.set(rest, ttl, data)?;
                self.counters.inc_set();
                Ok(())
            },
        }
    }

    /// Removes the entry at `path`; absent entries are a no-op.
    fn delete(&self, path: &[&str]) -> Result<(), InvalidPath> {
        match path {
            [] => Err(InvalidPath),
            _ => {
                self.root.delete(path)?;
                self.counters.inc_delete();
                Ok(())
            },
        }
    }

    /// The root holds no value; always empty.
    fn read(&self) -> Arc<[u8]> {
        self.root.read()
    }

    /// Sum of all children's subtree sizes.
    fn size(&self) -> usize {
        self.root.size()
    }

    /// Diagnostic view over the whole tree.
    fn visualize(&self) -> TreeView {
        self.root.visualize()
    }
}
