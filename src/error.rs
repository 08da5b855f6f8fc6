//! Crate-level error type

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::transport::TransportError;
use std::io;
use thiserror::Error;
use webrank_algorithms::PartitionError;

/// Errors that abort a run. None of them are recovered locally.
#[derive(Error, Debug)]
pub enum WebrankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Graph(#[from] GraphError),

    #[error("Partition error: {0}")]
    Partition(#[from] PartitionError),

    #[error("Communication error: {0}")]
    Transport(#[from] TransportError),

    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    #[error("Rank {rank} failed: {reason}")]
    Worker { rank: usize, reason: String },
}

pub type WebrankResult<T> = Result<T, WebrankError>;
