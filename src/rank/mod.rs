//! Distributed PageRank
//!
//! A run goes through three phases on every rank:
//! 1. [`distribute`]: the coordinator splits the graph into contiguous
//!    blocks and ships one to each worker
//! 2. [`RankEngine`]: a fixed number of aggregate / all-reduce / combine rounds
//! 3. [`report`]: the coordinator selects the top ranks and writes them out

pub mod distributor;
pub mod engine;
pub mod output;
pub mod runner;

pub use distributor::{distribute, LocalGraph};
pub use engine::RankEngine;
pub use output::{render_top_ranks, write_top_ranks, HEADER};
pub use runner::{
    compute, compute_local, report, run_coordinator, run_local, run_sequential, run_worker,
};
