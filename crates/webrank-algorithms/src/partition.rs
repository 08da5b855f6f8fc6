//! Contiguous block partitioning of source nodes across workers

use std::ops::Range;
use thiserror::Error;

/// Partitioning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Worker count must be positive")]
    NoWorkers,
}

pub type PartitionResult<T> = Result<T, PartitionError>;

/// Compute per-worker block sizes for `node_count` sources over `workers` workers.
///
/// Every worker gets `node_count / workers` sources; the first
/// `node_count % workers` workers get one more.
pub fn block_sizes(node_count: usize, workers: usize) -> PartitionResult<Vec<usize>> {
    if workers == 0 {
        return Err(PartitionError::NoWorkers);
    }

    let base = node_count / workers;
    let remainder = node_count % workers;

    Ok((0..workers)
        .map(|worker| if worker < remainder { base + 1 } else { base })
        .collect())
}

/// Half-open ranges over the source enumeration order, one per worker
pub fn block_ranges(node_count: usize, workers: usize) -> PartitionResult<Vec<Range<usize>>> {
    let sizes = block_sizes(node_count, workers)?;
    let mut start = 0;
    Ok(sizes
        .into_iter()
        .map(|size| {
            let range = start..start + size;
            start += size;
            range
        })
        .collect())
}
