//! Fixed-iteration PageRank loop over a distributed graph

use super::distributor::LocalGraph;
use crate::transport::{Collective, TransportResult};
use tracing::{debug, info};
use webrank_algorithms::{aggregate, combine, initial_ranks, PageRankConfig, Partition};

/// Drives the iteration loop on one rank.
///
/// Each rank holds its own copy of the rank vector; after every all-reduce
/// the copies are identical.
pub struct RankEngine<'a, C> {
    comm: &'a mut C,
    partition: Partition,
    config: PageRankConfig,
    ranks: Vec<f64>,
    iteration: usize,
}

impl<'a, C: Collective> RankEngine<'a, C> {
    pub fn new(comm: &'a mut C, local: LocalGraph, config: PageRankConfig) -> Self {
        Self {
            comm,
            partition: local.partition,
            config,
            ranks: initial_ranks(local.node_count),
            iteration: 0,
        }
    }

    /// Current rank vector
    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// One round: local aggregation, global reduction, damping
    pub async fn step(&mut self) -> TransportResult<()> {
        let d = self.config.damping_factor;
        let mut local = aggregate(&self.ranks, &self.partition, d);

        self.comm.all_reduce_sum(&mut local.contribution).await?;
        let dangling = self.comm.all_reduce_scalar(local.dangling).await?;

        self.ranks = combine(&local.contribution, dangling, d);
        self.iteration += 1;
        Ok(())
    }

    /// Run all configured iterations and return the final vector
    pub async fn run(mut self) -> TransportResult<Vec<f64>> {
        while self.iteration < self.config.iterations {
            self.step().await?;
            debug!(
                "Rank {} finished iteration {}/{}",
                self.comm.rank(),
                self.iteration,
                self.config.iterations
            );
        }

        if self.comm.is_coordinator() {
            info!(
                "Completed {} iterations over {} nodes",
                self.iteration,
                self.ranks.len()
            );
        }
        Ok(self.ranks)
    }
}
