//! In-process link: a full mesh of unbounded tokio channels

use super::{Link, Message, TransportError, TransportResult};
use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// One rank's end of an in-process channel mesh
pub struct MemoryLink {
    rank: usize,
    /// Sender per destination rank (None for self)
    outbound: Vec<Option<UnboundedSender<Message>>>,
    /// Receiver per source rank (None for self)
    inbound: Vec<Option<UnboundedReceiver<Message>>>,
}

impl MemoryLink {
    /// Create `size` connected links, indexed by rank
    pub fn mesh(size: usize) -> Vec<MemoryLink> {
        let mut outbound: Vec<Vec<Option<UnboundedSender<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut inbound: Vec<Vec<Option<UnboundedReceiver<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

        for from in 0..size {
            for to in 0..size {
                if from == to {
                    continue;
                }
                let (tx, rx) = unbounded_channel();
                outbound[from][to] = Some(tx);
                inbound[to][from] = Some(rx);
            }
        }

        outbound
            .into_iter()
            .zip(inbound)
            .enumerate()
            .map(|(rank, (outbound, inbound))| MemoryLink {
                rank,
                outbound,
                inbound,
            })
            .collect()
    }
}

#[async_trait]
impl Link for MemoryLink {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outbound.len()
    }

    async fn send(&mut self, peer: usize, message: Message) -> TransportResult<()> {
        let sender = self
            .outbound
            .get(peer)
            .and_then(Option::as_ref)
            .ok_or(TransportError::NoRoute(peer))?;

        sender
            .send(message)
            .map_err(|_| TransportError::Disconnected(peer))
    }

    async fn recv(&mut self, peer: usize) -> TransportResult<Message> {
        let receiver = self
            .inbound
            .get_mut(peer)
            .and_then(Option::as_mut)
            .ok_or(TransportError::NoRoute(peer))?;

        receiver.recv().await.ok_or(TransportError::Disconnected(peer))
    }
}
