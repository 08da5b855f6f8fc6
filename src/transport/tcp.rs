//! TCP link: workers connect to the coordinator, forming a star
//!
//! Only coordinator <-> worker routes exist. Every collective in
//! [`Communicator`](super::Communicator) is rooted at the coordinator, so no
//! worker-to-worker connection is needed.

use super::codec;
use super::{Link, Message, TransportError, TransportResult, COORDINATOR};
use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Delay between connection attempts while the coordinator is not yet listening
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// A framed connection to one peer
struct Connection {
    peer: usize,
    stream: TcpStream,
    buffer: BytesMut,
}

impl Connection {
    fn new(peer: usize, stream: TcpStream) -> TransportResult<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            peer,
            stream,
            buffer: BytesMut::with_capacity(4096),
        })
    }

    async fn write_message(&mut self, message: &Message) -> TransportResult<()> {
        let mut frame = BytesMut::new();
        codec::encode(message, &mut frame)?;
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    async fn read_message(&mut self) -> TransportResult<Message> {
        loop {
            if let Some(message) = codec::decode(&mut self.buffer)? {
                return Ok(message);
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                // Connection closed
                return Err(TransportError::Disconnected(self.peer));
            }
        }
    }
}

/// One rank's end of the TCP star
pub struct TcpLink {
    rank: usize,
    size: usize,
    /// Connection per peer rank; workers only hold the coordinator's
    peers: Vec<Option<Connection>>,
}

impl TcpLink {
    /// Bind `address` and wait for `size - 1` workers to join
    pub async fn bind_coordinator(address: &str, size: usize) -> TransportResult<Self> {
        let listener = TcpListener::bind(address).await?;
        Self::coordinator(listener, size).await
    }

    /// Accept `size - 1` workers on an already bound listener.
    ///
    /// Each worker introduces itself with its rank; once all ranks
    /// `1..size` have joined, every worker is told the group size.
    pub async fn coordinator(listener: TcpListener, size: usize) -> TransportResult<Self> {
        if size == 0 {
            return Err(TransportError::Protocol("group size must be positive".to_string()));
        }

        info!(
            "Coordinator listening on {}, waiting for {} workers",
            listener.local_addr()?,
            size - 1
        );

        let mut peers: Vec<Option<Connection>> = (0..size).map(|_| None).collect();
        let mut joined = 0;

        while joined < size - 1 {
            let (socket, peer_addr) = listener.accept().await?;
            let mut connection = Connection::new(usize::MAX, socket)?;

            let rank = match connection.read_message().await? {
                Message::Hello { rank } => rank as usize,
                other => {
                    return Err(TransportError::Protocol(format!(
                        "expected hello from {}, got {}",
                        peer_addr,
                        other.kind()
                    )))
                }
            };

            if rank == COORDINATOR || rank >= size {
                return Err(TransportError::Protocol(format!(
                    "worker at {} claims rank {} outside 1..{}",
                    peer_addr, rank, size
                )));
            }
            if peers[rank].is_some() {
                return Err(TransportError::Protocol(format!(
                    "rank {} joined twice (second from {})",
                    rank, peer_addr
                )));
            }

            debug!("Worker {} joined from {}", rank, peer_addr);
            connection.peer = rank;
            peers[rank] = Some(connection);
            joined += 1;
        }

        for connection in peers.iter_mut().flatten() {
            connection
                .write_message(&Message::Welcome { size: size as u32 })
                .await?;
        }

        info!("All {} ranks joined", size);
        Ok(Self {
            rank: COORDINATOR,
            size,
            peers,
        })
    }

    /// Connect to the coordinator as `rank`, retrying until `connect_timeout` elapses
    pub async fn worker(
        address: &str,
        rank: usize,
        connect_timeout: Duration,
    ) -> TransportResult<Self> {
        if rank == COORDINATOR {
            return Err(TransportError::Protocol(
                "rank 0 is the coordinator and cannot join as a worker".to_string(),
            ));
        }

        let deadline = Instant::now() + connect_timeout;
        let stream = loop {
            match TcpStream::connect(address).await {
                Ok(stream) => break stream,
                Err(e) if Instant::now() < deadline => {
                    debug!("Rank {} waiting for coordinator at {}: {}", rank, address, e);
                    sleep(CONNECT_RETRY_DELAY).await;
                }
                Err(_) => return Err(TransportError::ConnectTimeout(address.to_string())),
            }
        };

        let mut connection = Connection::new(COORDINATOR, stream)?;
        connection
            .write_message(&Message::Hello { rank: rank as u32 })
            .await?;

        let size = match connection.read_message().await? {
            Message::Welcome { size } => size as usize,
            other => {
                return Err(TransportError::Protocol(format!(
                    "expected welcome from coordinator, got {}",
                    other.kind()
                )))
            }
        };
        if rank >= size {
            return Err(TransportError::Protocol(format!(
                "rank {} outside group of size {}",
                rank, size
            )));
        }

        info!("Rank {} joined group of {} at {}", rank, size, address);
        let mut peers: Vec<Option<Connection>> = (0..size).map(|_| None).collect();
        peers[COORDINATOR] = Some(connection);

        Ok(Self { rank, size, peers })
    }

    fn connection(&mut self, peer: usize) -> TransportResult<&mut Connection> {
        self.peers
            .get_mut(peer)
            .and_then(Option::as_mut)
            .ok_or(TransportError::NoRoute(peer))
    }
}

#[async_trait]
impl Link for TcpLink {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&mut self, peer: usize, message: Message) -> TransportResult<()> {
        self.connection(peer)?.write_message(&message).await
    }

    async fn recv(&mut self, peer: usize) -> TransportResult<Message> {
        self.connection(peer)?.read_message().await
    }
}
