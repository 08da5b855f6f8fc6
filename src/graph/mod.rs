//! Graph storage
//!
//! The coordinator loads the whole adjacency structure once; workers only
//! ever see the [`Partition`](webrank_algorithms::Partition) they receive.

pub mod store;

pub use store::{GraphError, GraphResult, GraphStore, Position};
