//! treecache: an in-process, hierarchical, path-addressed TTL cache.
//!
//! Values are stored and retrieved by an ordered sequence of string
//! segments, forming a tree where any prefix of a path may itself hold a
//! value and own further children. Every stored value carries its own
//! time-to-live and is removed automatically when it elapses.
//!
//! Each node owns an independent reader/writer lock over its own fields,
//! and no operation ever holds two node locks at once — readers and
//! writers on unrelated subtrees never contend, and the structure is
//! deadlock-free by construction.
//!
//! ```
//! use treecache::{TreeCache, TreeOps};
//! use std::time::Duration;
//!
//! let cache = TreeCache::new();
//! cache.set(&["users", "alice"], Duration::from_secs(30), b"profile").unwrap();
//!
//! let node = cache.get(&["users", "alice"]).unwrap();
//! assert_eq!(&*node.read(), b"profile");
//!
//! // Any prefix resolves to a live branch node.
//! assert!(cache.get(&["users"]).is_some());
//! ```

pub mod error;
mod expiry;
pub mod metrics;
pub mod node;
pub mod prelude;
pub mod traits;
pub mod tree;
pub mod visualize;

pub use error::InvalidPath;
pub use metrics::TreeMetrics;
pub use node::Node;
pub use traits::TreeOps;
pub use tree::TreeCache;
pub use visualize::{human_bytes, TreeView};
