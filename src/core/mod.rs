pub mod ordered;
pub mod snapshot;

pub use ordered::OrderedSet;
pub use snapshot::SnapshotCell;
