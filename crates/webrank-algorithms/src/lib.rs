pub mod common;
pub mod partition;
pub mod aggregate;
pub mod pagerank;
pub mod select;

pub use common::{NodeId, Partition};
pub use partition::{block_ranges, block_sizes, PartitionError, PartitionResult};
pub use aggregate::{aggregate, LocalContribution};
pub use pagerank::{combine, initial_ranks, page_rank, PageRankConfig};
pub use select::{top_k, RankedNode, TOP_K};
