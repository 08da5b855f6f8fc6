//! Webrank
//!
//! Distributed PageRank over a directed graph. One process (the coordinator,
//! rank 0) loads the adjacency list and splits it into contiguous blocks;
//! every rank then aggregates rank contributions for its own block and the
//! partial vectors are summed across ranks each iteration.
//!
//! # Architecture
//!
//! - [`graph`]: input parsing and the ordered adjacency store
//! - [`transport`]: framed links (in-process channels or TCP) and the
//!   point-to-point and collective operations built on them
//! - [`rank`]: distribution, the iteration engine and result output
//! - `webrank-algorithms`: the pure numeric kernels (partitioning,
//!   aggregation, combination, top-k selection)
//!
//! ## Example Usage
//!
//! ```rust
//! use webrank::graph::GraphStore;
//! use webrank::rank::compute_local;
//! use webrank::PageRankConfig;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let store = GraphStore::from_reader("0 1\n1 0 2\n2\n".as_bytes()).unwrap();
//!
//! let ranks = runtime
//!     .block_on(compute_local(store, 2, PageRankConfig::default()))
//!     .unwrap();
//! assert_eq!(ranks.len(), 3);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod graph;
pub mod rank;
pub mod transport;

// Re-export main types for convenience
pub use config::{ClusterConfig, ConfigError, ConfigResult, RunConfig};
pub use error::{WebrankError, WebrankResult};
pub use graph::{GraphError, GraphResult, GraphStore};
pub use rank::{LocalGraph, RankEngine};
pub use transport::{
    Collective, Communicator, Group, Link, MemoryLink, Message, Messenger, TcpLink,
    TransportError, TransportResult, COORDINATOR,
};
pub use webrank_algorithms::{NodeId, PageRankConfig, Partition, RankedNode, TOP_K};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
