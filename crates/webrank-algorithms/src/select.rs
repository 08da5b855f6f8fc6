//! Top-k selection over a final rank vector

use super::common::NodeId;

/// Number of nodes reported by a run
pub const TOP_K: usize = 10;

/// A node together with its final rank
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedNode {
    pub node: NodeId,
    pub rank: f64,
}

/// Select up to `k` highest ranks in descending order.
///
/// Repeated linear scan, O(k·N). Equal ranks resolve to the lowest node id.
pub fn top_k(ranks: &[f64], k: usize) -> Vec<RankedNode> {
    let mut taken = vec![false; ranks.len()];
    let mut selected = Vec::with_capacity(k.min(ranks.len()));

    for _ in 0..k.min(ranks.len()) {
        let mut best: Option<usize> = None;
        for (idx, &rank) in ranks.iter().enumerate() {
            if taken[idx] {
                continue;
            }
            match best {
                Some(b) if rank <= ranks[b] => {}
                _ => best = Some(idx),
            }
        }

        let Some(idx) = best else { break };
        taken[idx] = true;
        selected.push(RankedNode {
            node: idx as NodeId,
            rank: ranks[idx],
        });
    }

    selected
}
