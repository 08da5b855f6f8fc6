//! End-to-end runs: load, distribute, iterate, report

use super::distributor::distribute;
use super::engine::RankEngine;
use super::output::write_top_ranks;
use crate::config::{ClusterConfig, ConfigError, RunConfig};
use crate::error::{WebrankError, WebrankResult};
use crate::graph::GraphStore;
use crate::transport::{Collective, Communicator, MemoryLink, Messenger, TcpLink, COORDINATOR};
use futures::future::join_all;
use std::path::Path;
use tracing::info;
use webrank_algorithms::{page_rank, top_k, PageRankConfig, PartitionError, RankedNode, TOP_K};

/// Distribute the graph and run all iterations on one rank.
///
/// Every rank returns the same final vector.
pub async fn compute<C>(
    comm: &mut C,
    store: Option<&GraphStore>,
    config: PageRankConfig,
) -> WebrankResult<Vec<f64>>
where
    C: Messenger + Collective,
{
    let local = distribute(comm, store).await?;
    let ranks = RankEngine::new(comm, local, config).run().await?;
    Ok(ranks)
}

/// Select the top ranks and write them to `output`
pub fn report(ranks: &[f64], output: impl AsRef<Path>) -> WebrankResult<Vec<RankedNode>> {
    let output = output.as_ref();
    let top = top_k(ranks, TOP_K);
    write_top_ranks(output, &top)?;
    info!("Wrote top {} ranks to {}", top.len(), output.display());
    Ok(top)
}

/// Run `workers` ranks as tokio tasks over an in-process channel mesh.
///
/// Returns the coordinator's final vector. The first failing rank, in rank
/// order, determines the error.
pub async fn compute_local(
    store: GraphStore,
    workers: usize,
    config: PageRankConfig,
) -> WebrankResult<Vec<f64>> {
    if workers == 0 {
        return Err(PartitionError::NoWorkers.into());
    }

    let mut store = Some(store);
    let mut tasks = Vec::with_capacity(workers);
    for (rank, link) in MemoryLink::mesh(workers).into_iter().enumerate() {
        let store = if rank == COORDINATOR { store.take() } else { None };
        tasks.push(tokio::spawn(async move {
            let mut comm = Communicator::new(link);
            compute(&mut comm, store.as_ref(), config).await
        }));
    }

    let mut ranks = None;
    for (rank, joined) in join_all(tasks).await.into_iter().enumerate() {
        let result = joined.map_err(|e| WebrankError::Worker {
            rank,
            reason: e.to_string(),
        })?;
        let values = result?;
        if rank == COORDINATOR {
            ranks = Some(values);
        }
    }

    ranks.ok_or_else(|| WebrankError::Worker {
        rank: COORDINATOR,
        reason: "coordinator produced no result".to_string(),
    })
}

/// Load the graph and run `workers` in-process ranks
pub async fn run_local(config: &RunConfig, workers: usize) -> WebrankResult<Vec<RankedNode>> {
    config.validate()?;
    let store = GraphStore::load(&config.input)?;

    let ranks = compute_local(store, workers, config.page_rank_config()).await?;
    report(&ranks, &config.output)
}

/// Rank 0 of a TCP run: load, wait for the workers, compute, report.
///
/// The graph is loaded before the listener is bound, so bad input never
/// reaches the network.
pub async fn run_coordinator(
    config: &RunConfig,
    cluster: &ClusterConfig,
) -> WebrankResult<Vec<RankedNode>> {
    config.validate()?;
    cluster.validate()?;
    let store = GraphStore::load(&config.input)?;

    let link = TcpLink::bind_coordinator(&cluster.coordinator, cluster.workers).await?;
    let mut comm = Communicator::new(link);
    let ranks = compute(&mut comm, Some(&store), config.page_rank_config()).await?;
    report(&ranks, &config.output)
}

/// Any other rank of a TCP run
pub async fn run_worker(config: &RunConfig, cluster: &ClusterConfig, rank: usize) -> WebrankResult<()> {
    config.validate()?;
    if rank == COORDINATOR {
        return Err(ConfigError::Invalid("rank 0 must run as the coordinator".to_string()).into());
    }

    let link = TcpLink::worker(&cluster.coordinator, rank, cluster.connect_timeout()).await?;
    let mut comm = Communicator::new(link);
    compute(&mut comm, None, config.page_rank_config()).await?;
    info!("Rank {} done", rank);
    Ok(())
}

/// Single-process reference run
pub fn run_sequential(config: &RunConfig) -> WebrankResult<Vec<RankedNode>> {
    config.validate()?;
    let store = GraphStore::load(&config.input)?;

    let ranks = page_rank(&store.to_partition(), store.node_count(), config.page_rank_config());
    report(&ranks, &config.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use webrank_algorithms::NodeId;

    fn sample_store() -> GraphStore {
        GraphStore::from_reader("0\n1 2\n2 1\n3 0 1\n4 1 3 5\n5 1 4\n".as_bytes()).unwrap()
    }

    fn random_store(nodes: u32, seed: u64) -> GraphStore {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut adjacency = Vec::new();
        for source in 0..nodes {
            let degree: usize = rng.gen_range(0..6);
            let targets: Vec<NodeId> = (0..degree).map(|_| rng.gen_range(0..nodes)).collect();
            adjacency.push((source, targets));
        }
        GraphStore::from_adjacency(adjacency).unwrap()
    }

    #[tokio::test]
    async fn test_six_node_graph_single_iteration() {
        let config = PageRankConfig { damping_factor: 0.85, iterations: 1 };
        let ranks = compute_local(sample_store(), 1, config).await.unwrap();

        let r = 1.0 / 6.0;
        let d = 0.85;
        let dangling = r * d / 6.0;
        // Node 1 hears from 2, 3, 4 and 5
        let incoming_1 = r * d / 1.0 + r * d / 2.0 + r * d / 3.0 + r * d / 2.0;
        assert_eq!(ranks[0], r * d / 2.0 + (1.0 - d) / 6.0 + dangling);
        assert_eq!(ranks[1], incoming_1 + (1.0 - d) / 6.0 + dangling);
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_result() {
        let store = random_store(200, 7);
        let config = PageRankConfig::default();

        let single = compute_local(store.clone(), 1, config).await.unwrap();
        let spread = compute_local(store, 4, config).await.unwrap();

        for (a, b) in single.iter().zip(&spread) {
            assert!((a - b).abs() < 1e-9);
        }
        let sum: f64 = spread.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_matches_sequential_oracle() {
        let store = random_store(120, 11);
        let config = PageRankConfig { damping_factor: 0.85, iterations: 25 };

        let oracle = page_rank(&store.to_partition(), store.node_count(), config);
        let distributed = compute_local(store, 3, config).await.unwrap();

        for (a, b) in oracle.iter().zip(&distributed) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_more_workers_than_nodes() {
        let config = PageRankConfig::default();
        let few = compute_local(sample_store(), 2, config).await.unwrap();
        let many = compute_local(sample_store(), 9, config).await.unwrap();

        for (a, b) in few.iter().zip(&many) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let result = compute_local(sample_store(), 0, PageRankConfig::default()).await;
        assert!(matches!(result, Err(WebrankError::Partition(PartitionError::NoWorkers))));
    }

    #[tokio::test]
    async fn test_run_local_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("graph.txt");
        let output = dir.path().join("ranks.txt");
        std::fs::write(&input, "0\n1 2\n2 1\n3 0 1\n4 1 3 5\n5 1 4\n").unwrap();

        let top = run_local(&RunConfig::new(&input, &output), 2).await.unwrap();
        assert_eq!(top.len(), 6);
        assert!(top.windows(2).all(|pair| pair[0].rank >= pair[1].rank));

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 7);
        assert!(text.starts_with(crate::rank::HEADER));
    }

    #[tokio::test]
    async fn test_malformed_input_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("graph.txt");
        let output = dir.path().join("ranks.txt");
        std::fs::write(&input, "0 1\n1 oops\n").unwrap();

        let result = run_local(&RunConfig::new(&input, &output), 2).await;
        assert!(matches!(result, Err(WebrankError::Graph(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_sequential_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("graph.txt");
        let output = dir.path().join("ranks.txt");
        std::fs::write(&input, "0 1\n1 0\n").unwrap();

        let top = run_sequential(&RunConfig::new(&input, &output)).unwrap();
        assert_eq!(top.len(), 2);
        assert!((top[0].rank - 0.5).abs() < 1e-12);
        // Equal ranks resolve to the lowest id
        assert_eq!(top[0].node, 0);
    }
}
