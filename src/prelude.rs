pub use crate::error::InvalidPath;
pub use crate::metrics::TreeMetrics;
pub use crate::node::Node;
pub use crate::traits::TreeOps;
pub use crate::tree::TreeCache;
pub use crate::visualize::{human_bytes, TreeView};
