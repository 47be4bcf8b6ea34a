// roswatch common library - tree formatting and rate statistics

pub mod error;
pub mod rate_stats;
pub mod rolling_window;
pub mod tf;
pub mod tree;

// Flattened re-exports
pub use self::error::{Error, Result};
pub use self::rate_stats::{RateSnapshot, RateStats, DEFAULT_WINDOW_CAPACITY};
pub use self::rolling_window::RollingWindow;
pub use self::tf::{lookup_transform, Transform};
pub use self::tree::{
    Connectors, FlatLine, Forest, ListSurface, NamespaceBuilder, NamespaceEntry, NavInput, Path,
    SurfaceLine, TreeController, TreeEvent, TreeModel, TreeNode,
};
