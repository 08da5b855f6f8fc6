//! Graph distribution from the coordinator to the workers
//!
//! For each worker `i` in `1..P`, in increasing order, the coordinator sends:
//! 1. `[block_size]`
//! 2. the block's source ids
//! 3. the block's out-degrees
//! 4. one target list per source, in source order
//!
//! Block 0 stays on the coordinator. All ranks then take part in a broadcast
//! of the total node count.

use crate::config::ConfigError;
use crate::error::WebrankResult;
use crate::graph::GraphStore;
use crate::transport::{Collective, Messenger, TransportError, TransportResult, COORDINATOR};
use tracing::{debug, info};
use webrank_algorithms::{block_ranges, NodeId, Partition};

/// A rank's share of the graph after distribution
#[derive(Debug, Clone, PartialEq)]
pub struct LocalGraph {
    /// Sources owned by this rank
    pub partition: Partition,
    /// Total node count, agreed on by every rank
    pub node_count: usize,
}

/// Run the distribution phase on any rank.
///
/// The coordinator must pass the loaded graph; other ranks pass `None`.
pub async fn distribute<C>(comm: &mut C, store: Option<&GraphStore>) -> WebrankResult<LocalGraph>
where
    C: Messenger + Collective,
{
    let (partition, node_count) = if comm.is_coordinator() {
        let store = store.ok_or_else(|| {
            ConfigError::Invalid("the coordinator needs a loaded graph".to_string())
        })?;
        let partition = scatter_blocks(comm, store).await?;
        (partition, store.node_count() as u64)
    } else {
        (receive_block(comm).await?, 0)
    };

    let node_count = comm.broadcast(node_count).await? as usize;

    debug!(
        "Rank {} owns {} sources ({} dangling) of {}: {:?}",
        comm.rank(),
        partition.len(),
        partition.dangling_count(),
        node_count,
        partition.sources()
    );

    Ok(LocalGraph {
        partition,
        node_count,
    })
}

async fn scatter_blocks<C: Messenger>(comm: &mut C, store: &GraphStore) -> WebrankResult<Partition> {
    let workers = comm.size();
    let ranges = block_ranges(store.node_count(), workers)?;
    let mut local = Partition::new();

    for (worker, range) in ranges.into_iter().enumerate() {
        let block = store.partition(range);
        if worker == COORDINATOR {
            local = block;
            continue;
        }
        send_block(comm, worker, &block).await?;
    }

    info!(
        "Distributed {} nodes over {} ranks",
        store.node_count(),
        workers
    );
    Ok(local)
}

async fn send_block<C: Messenger>(comm: &mut C, worker: usize, block: &Partition) -> TransportResult<()> {
    let block_size = to_wire(block.len())?;
    let degrees = (0..block.len())
        .map(|idx| to_wire(block.out_degree(idx)))
        .collect::<TransportResult<Vec<i32>>>()?;

    comm.send_ints(worker, &[block_size]).await?;
    comm.send_ints(worker, &encode_ids(block.sources())?).await?;
    comm.send_ints(worker, &degrees).await?;
    for (_, targets) in block.iter() {
        comm.send_ints(worker, &encode_ids(targets)?).await?;
    }

    debug!("Sent {} sources to rank {}", block.len(), worker);
    Ok(())
}

async fn receive_block<C: Messenger>(comm: &mut C) -> TransportResult<Partition> {
    let header = comm.recv_ints(COORDINATOR).await?;
    let block_size = match header[..] {
        [size] => from_wire(size)?,
        _ => {
            return Err(TransportError::Protocol(format!(
                "block header has {} values, expected 1",
                header.len()
            )))
        }
    };

    let sources = decode_ids(comm.recv_ints(COORDINATOR).await?)?;
    expect_len("source list", sources.len(), block_size)?;

    let degrees = comm.recv_ints(COORDINATOR).await?;
    expect_len("degree list", degrees.len(), block_size)?;

    let mut partition = Partition::new();
    for (&source, &degree) in sources.iter().zip(&degrees) {
        let targets = decode_ids(comm.recv_ints(COORDINATOR).await?)?;
        expect_len("target list", targets.len(), from_wire(degree)?)?;
        partition.push(source, &targets);
    }

    Ok(partition)
}

fn expect_len(what: &str, actual: usize, expected: usize) -> TransportResult<()> {
    if actual != expected {
        return Err(TransportError::Protocol(format!(
            "{} has {} values, expected {}",
            what, actual, expected
        )));
    }
    Ok(())
}

fn to_wire(value: usize) -> TransportResult<i32> {
    i32::try_from(value)
        .map_err(|_| TransportError::Protocol(format!("{} does not fit in int32", value)))
}

fn from_wire(value: i32) -> TransportResult<usize> {
    usize::try_from(value)
        .map_err(|_| TransportError::Protocol(format!("negative value {} on the wire", value)))
}

fn encode_ids(ids: &[NodeId]) -> TransportResult<Vec<i32>> {
    ids.iter().map(|&id| to_wire(id as usize)).collect()
}

fn decode_ids(buffer: Vec<i32>) -> TransportResult<Vec<NodeId>> {
    buffer
        .into_iter()
        .map(|value| from_wire(value).map(|id| id as NodeId))
        .collect()
}
