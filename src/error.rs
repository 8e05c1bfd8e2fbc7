//! Error types for the treecache library.
//!
//! ## Key Components
//!
//! - [`InvalidPath`]: Returned when `set` or `delete` is called with an
//!   empty path.
//!
//! Lookups never fail: a missing key is an `Option::None`, not an error,
//! because probing unset paths is routine. Deleting an absent key is a
//! successful no-op for the same reason.
//!
//! ## Example Usage
//!
//! ```
//! use treecache::{TreeCache, TreeOps, InvalidPath};
//! use std::time::Duration;
//!
//! let cache = TreeCache::new();
//!
//! // An empty path has no slot to write into.
//! let err = cache.set(&[], Duration::from_secs(1), b"data").unwrap_err();
//! assert_eq!(err, InvalidPath);
//!
//! // Deleting something that was never set is fine.
//! assert!(cache.delete(&["never", "set"]).is_ok());
//! ```

use std::fmt;

/// Error returned when an operation is given an empty path.
///
/// Produced by `set` and `delete`, which both need at least one segment
/// to address a slot in a parent mapping. This is the only recoverable
/// error kind in the crate; everything else is either an absent lookup
/// (`None`) or a programming-invariant violation made unrepresentable by
/// the single closed [`Node`](crate::node::Node) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPath;

impl fmt::Display for InvalidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("path must contain at least one segment")
    }
}

impl std::error::Error for InvalidPath {}
