//! Point-to-point and collective operations over a [`Link`]

use super::{Collective, Group, Link, Message, Messenger, TransportError, TransportResult, COORDINATOR};
use async_trait::async_trait;

/// Communicator for one rank.
///
/// Collectives are rooted at the coordinator: workers send their buffer to
/// rank 0, which folds them in rank order and sends the result back. Every
/// rank therefore ends with bit-identical values.
pub struct Communicator<L> {
    link: L,
}

impl<L: Link> Communicator<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }
}

impl<L: Link> Group for Communicator<L> {
    fn rank(&self) -> usize {
        self.link.rank()
    }

    fn size(&self) -> usize {
        self.link.size()
    }
}

#[async_trait]
impl<L: Link> Messenger for Communicator<L> {
    async fn send_ints(&mut self, dest: usize, buffer: &[i32]) -> TransportResult<()> {
        self.link.send(dest, Message::Ints(buffer.to_vec())).await
    }

    async fn recv_ints(&mut self, source: usize) -> TransportResult<Vec<i32>> {
        match self.link.recv(source).await? {
            Message::Ints(buffer) => Ok(buffer),
            other => Err(unexpected("int buffer", source, &other)),
        }
    }
}

#[async_trait]
impl<L: Link> Collective for Communicator<L> {
    async fn all_reduce_sum(&mut self, values: &mut [f64]) -> TransportResult<()> {
        let size = self.link.size();
        if size == 1 {
            return Ok(());
        }

        if self.link.rank() == COORDINATOR {
            for peer in 1..size {
                let partial = self.recv_doubles(peer, values.len()).await?;
                for (total, part) in values.iter_mut().zip(&partial) {
                    *total += part;
                }
            }
            for peer in 1..size {
                self.link.send(peer, Message::Doubles(values.to_vec())).await?;
            }
        } else {
            self.link
                .send(COORDINATOR, Message::Doubles(values.to_vec()))
                .await?;
            let reduced = self.recv_doubles(COORDINATOR, values.len()).await?;
            values.copy_from_slice(&reduced);
        }

        Ok(())
    }

    async fn broadcast(&mut self, value: u64) -> TransportResult<u64> {
        let size = self.link.size();

        if self.link.rank() == COORDINATOR {
            for peer in 1..size {
                self.link.send(peer, Message::Count(value)).await?;
            }
            return Ok(value);
        }

        match self.link.recv(COORDINATOR).await? {
            Message::Count(value) => Ok(value),
            other => Err(unexpected("count", COORDINATOR, &other)),
        }
    }
}

impl<L: Link> Communicator<L> {
    async fn recv_doubles(&mut self, peer: usize, expected_len: usize) -> TransportResult<Vec<f64>> {
        match self.link.recv(peer).await? {
            Message::Doubles(buffer) if buffer.len() == expected_len => Ok(buffer),
            Message::Doubles(buffer) => Err(TransportError::Protocol(format!(
                "rank {} reduced {} values, expected {}",
                peer,
                buffer.len(),
                expected_len
            ))),
            other => Err(unexpected("double buffer", peer, &other)),
        }
    }
}

fn unexpected(wanted: &str, peer: usize, got: &Message) -> TransportError {
    TransportError::Protocol(format!(
        "expected {} from rank {}, got {}",
        wanted,
        peer,
        got.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryLink;

    fn communicators(size: usize) -> Vec<Communicator<MemoryLink>> {
        MemoryLink::mesh(size).into_iter().map(Communicator::new).collect()
    }

    #[tokio::test]
    async fn test_all_reduce_replicates_sum() {
        let handles: Vec<_> = communicators(4)
            .into_iter()
            .map(|mut comm| {
                tokio::spawn(async move {
                    let rank = comm.rank() as f64;
                    let mut values = vec![rank, 1.0, 10.0 * rank];
                    comm.all_reduce_sum(&mut values).await.unwrap();
                    let dangling = comm.all_reduce_scalar(0.5).await.unwrap();
                    (values, dangling)
                })
            })
            .collect();

        for handle in handles {
            let (values, dangling) = handle.await.unwrap();
            assert_eq!(values, vec![6.0, 4.0, 60.0]);
            assert_eq!(dangling, 2.0);
        }
    }

    #[tokio::test]
    async fn test_broadcast_from_coordinator() {
        let handles: Vec<_> = communicators(3)
            .into_iter()
            .map(|mut comm| {
                tokio::spawn(async move {
                    let value = if comm.is_coordinator() { 42 } else { 0 };
                    comm.broadcast(value).await.unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
    }

    #[tokio::test]
    async fn test_single_rank_collectives_are_local() {
        let mut comm = communicators(1).pop().unwrap();
        let mut values = vec![1.5, 2.5];
        comm.all_reduce_sum(&mut values).await.unwrap();
        assert_eq!(values, vec![1.5, 2.5]);
        assert_eq!(comm.broadcast(9).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_mismatched_reduction_length_is_protocol_error() {
        let mut comms = communicators(2);
        let mut worker = comms.pop().unwrap();
        let mut coordinator = comms.pop().unwrap();

        let handle = tokio::spawn(async move {
            let mut short = vec![1.0];
            let _ = worker.all_reduce_sum(&mut short).await;
        });

        let mut values = vec![1.0, 2.0];
        let result = coordinator.all_reduce_sum(&mut values).await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));
        drop(coordinator);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_point_to_point_type_mismatch() {
        let mut comms = communicators(2);
        let mut worker = comms.pop().unwrap();
        let mut coordinator = comms.pop().unwrap();

        coordinator.broadcast(5).await.unwrap();
        let result = worker.recv_ints(COORDINATOR).await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }
}
