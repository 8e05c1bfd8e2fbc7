//! The shared capability set for tree positions.
//!
//! Both the root ([`TreeCache`](crate::tree::TreeCache)) and every
//! position below it ([`Node`](crate::node::Node)) expose the same six
//! operations. The trait keeps the two composable: an operation resolved
//! partway down the tree hands back a `Node`, and the caller keeps using
//! the exact same vocabulary on it.
//!
//! ## Operations
//!
//! | Operation   | Root behavior                    | Node behavior                      |
//! |-------------|----------------------------------|------------------------------------|
//! | `get`       | empty path → `None`              | empty path → `Some(self)`          |
//! | `set`       | empty path → `InvalidPath`       | empty path → overwrite own value   |
//! | `delete`    | empty path → `InvalidPath`       | empty path → `InvalidPath`         |
//! | `read`      | always empty bytes               | stored payload snapshot            |
//! | `size`      | sum over children                | own payload + children             |
//! | `visualize` | nested view of all children      | nested view including own payload  |
//!
//! ## Example Usage
//!
//! ```
//! use treecache::{TreeCache, TreeOps};
//! use std::time::Duration;
//!
//! let cache = TreeCache::new();
//! let ttl = Duration::from_secs(60);
//! cache.set(&["session", "abc"], ttl, b"token").unwrap();
//!
//! // Resolve the branch, then keep operating on it directly.
//! let session = cache.get(&["session"]).unwrap();
//! assert_eq!(&*session.get(&["abc"]).unwrap().read(), b"token");
//! assert_eq!(session.size(), 5);
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::InvalidPath;
use crate::node::Node;
use crate::visualize::TreeView;

/// Operations shared by the root and every node of the tree.
///
/// Implementations hold at most one node lock at a time; no operation
/// provides snapshot isolation across levels of the path. A traversal
/// racing a concurrent write on some slot observes either the old or the
/// new child for that slot (last write wins per slot).
pub trait TreeOps {
    /// Resolves a path to the node stored there, if any.
    ///
    /// Never fails: unset paths are `None`. On the root an empty path is
    /// also `None` (the root is never itself a lookup result); on a node
    /// an empty path resolves to the node itself, which is how a caller
    /// gets hold of the position actually carrying a value.
    fn get(&self, path: &[&str]) -> Option<Node>;

    /// Writes `data` at `path`, expiring after `ttl`.
    ///
    /// Creates intermediate nodes lazily. Writing a value at a node
    /// discards whatever subtree previously hung beneath that position,
    /// and writing *through* an existing deep branch replaces it with a
    /// fresh one — a destructive overwrite, not a merge.
    ///
    /// Fails with [`InvalidPath`] only on the root with an empty path;
    /// called on a node with an empty path it overwrites the node's own
    /// value in place.
    fn set(&self, path: &[&str], ttl: Duration, data: &[u8]) -> Result<(), InvalidPath>;

    /// Removes the entry at `path` from its parent's mapping.
    ///
    /// Removing an absent entry succeeds as a no-op. Fails with
    /// [`InvalidPath`] on an empty path.
    fn delete(&self, path: &[&str]) -> Result<(), InvalidPath>;

    /// Returns a snapshot of the stored payload.
    ///
    /// Empty if this position never held a value (the root never does),
    /// or if a later branch write cleared it.
    fn read(&self) -> Arc<[u8]>;

    /// Aggregate payload size of this subtree in bytes.
    fn size(&self) -> usize;

    /// Builds a diagnostic view of this subtree. Never mutates.
    fn visualize(&self) -> TreeView;
}
