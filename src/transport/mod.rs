//! Message transport between ranks
//!
//! Two abstractions sit on top of a framed [`Link`]:
//! - [`Messenger`]: ordered point-to-point delivery of typed buffers, used
//!   once to distribute the graph
//! - [`Collective`]: sum all-reduce and broadcast, used every iteration
//!
//! Links:
//! - [`MemoryLink`]: in-process channel mesh, one tokio task per rank
//! - [`TcpLink`]: star of TCP connections around the coordinator

pub mod codec;
pub mod communicator;
pub mod memory;
pub mod tcp;

pub use communicator::Communicator;
pub use memory::MemoryLink;
pub use tcp::TcpLink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Rank of the process that loads the graph and reports results
pub const COORDINATOR: usize = 0;

/// Transport errors. All of them are fatal for the run.
#[derive(Error, Debug)]
pub enum TransportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Frame payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Unexpected message or malformed buffer structure
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Frame of {0} bytes exceeds the frame size limit")]
    FrameTooLarge(usize),

    #[error("Rank {0} disconnected")]
    Disconnected(usize),

    #[error("No route to rank {0}")]
    NoRoute(usize),

    #[error("Timed out connecting to coordinator at {0}")]
    ConnectTimeout(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Messages exchanged between ranks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// First frame on a new worker connection
    Hello { rank: u32 },
    /// Coordinator reply carrying the process-group size
    Welcome { size: u32 },
    /// Ordered int32 buffer (graph distribution)
    Ints(Vec<i32>),
    /// Double buffer (reduction traffic)
    Doubles(Vec<f64>),
    /// Scalar count (broadcast traffic)
    Count(u64),
}

impl Message {
    /// Short name used in protocol diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Hello { .. } => "hello",
            Message::Welcome { .. } => "welcome",
            Message::Ints(_) => "int buffer",
            Message::Doubles(_) => "double buffer",
            Message::Count(_) => "count",
        }
    }
}

/// Framed, ordered, reliable delivery between two ranks.
///
/// Messages sent from one rank to another arrive in send order. A send must
/// never wait for the peer to post a matching receive.
#[async_trait]
pub trait Link: Send {
    /// This process's rank
    fn rank(&self) -> usize;

    /// Number of ranks in the group
    fn size(&self) -> usize;

    async fn send(&mut self, peer: usize, message: Message) -> TransportResult<()>;

    async fn recv(&mut self, peer: usize) -> TransportResult<Message>;
}

/// Identity of a process inside its group
pub trait Group {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }
}

/// Ordered point-to-point exchange of int32 buffers
#[async_trait]
pub trait Messenger: Group + Send {
    async fn send_ints(&mut self, dest: usize, buffer: &[i32]) -> TransportResult<()>;

    async fn recv_ints(&mut self, source: usize) -> TransportResult<Vec<i32>>;
}

/// Collective operations. Every rank must make the same sequence of calls;
/// each call returns only once all ranks have posted theirs.
#[async_trait]
pub trait Collective: Group + Send {
    /// Element-wise sum across all ranks; every rank ends with the same result
    async fn all_reduce_sum(&mut self, values: &mut [f64]) -> TransportResult<()>;

    /// Publish the coordinator's `value` to every rank. Non-coordinator input is ignored.
    async fn broadcast(&mut self, value: u64) -> TransportResult<u64>;

    /// Scalar sum across all ranks
    async fn all_reduce_scalar(&mut self, value: f64) -> TransportResult<f64> {
        let mut buffer = [value];
        self.all_reduce_sum(&mut buffer).await?;
        Ok(buffer[0])
    }
}
