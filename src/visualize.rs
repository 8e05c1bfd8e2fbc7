//! Diagnostic tree dumps.
//!
//! [`TreeView`] is a point-in-time, purely descriptive rendering of the
//! tree shape: every child segment with its aggregate subtree size, nested
//! recursively. Building a view never mutates the tree and never holds
//! more than one node lock at a time, so the view is not a consistent
//! snapshot across levels — concurrent writers may be observed partially.
//!
//! ## Key Components
//!
//! - [`TreeView`]: nested segment → subtree-size structure.
//! - [`human_bytes`]: byte-count formatter used in rendered output.
//!
//! ## Example Usage
//!
//! ```
//! use treecache::{TreeCache, TreeOps};
//! use std::time::Duration;
//!
//! let cache = TreeCache::new();
//! let ttl = Duration::from_secs(60);
//! cache.set(&["users", "alice"], ttl, b"profile-a").unwrap();
//! cache.set(&["users", "bob"], ttl, b"profile-b").unwrap();
//!
//! let view = cache.visualize();
//! assert_eq!(view.size, 18);
//! assert_eq!(view.children["users"].children.len(), 2);
//! println!("{view}");
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Nested diagnostic view of a subtree.
///
/// `size` is the aggregate byte count of the subtree (own payload plus
/// all descendants), matching what `size()` reports for the same node.
/// Children are keyed by segment in a `BTreeMap` so rendering is
/// deterministic even though the live children mapping is unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeView {
    /// Aggregate subtree size in bytes.
    pub size: usize,
    /// Per-segment views of the children.
    pub children: BTreeMap<String, TreeView>,
}

impl TreeView {
    /// Aggregate size formatted for humans, e.g. `"12.3 KB"`.
    pub fn size_display(&self) -> String {
        human_bytes(self.size as u64)
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, label: &str, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{label}  {}",
            "",
            self.size_display(),
            indent = depth * 2
        )?;
        for (segment, child) in &self.children {
            child.render(f, segment, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeView {
    /// Renders an indented tree, one line per node, sizes humanized.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, ".", 0)
    }
}

/// Formats a byte count as a short human-readable string.
///
/// Uses 1024-based units with one decimal above the byte range.
///
/// # Example
///
/// ```
/// use treecache::visualize::human_bytes;
///
/// assert_eq!(human_bytes(0), "0 B");
/// assert_eq!(human_bytes(1023), "1023 B");
/// assert_eq!(human_bytes(12_595), "12.3 KB");
/// assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MB");
/// ```
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
