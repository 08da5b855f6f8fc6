//! Per-iteration local aggregation of rank contributions

use super::common::Partition;

/// One worker's share of the next rank vector
#[derive(Debug, Clone, PartialEq)]
pub struct LocalContribution {
    /// Damped mass pushed along local out-links, indexed by target id
    pub contribution: Vec<f64>,
    /// Damped mass of local dangling sources, already spread over all N nodes
    pub dangling: f64,
}

/// Compute a worker's contribution from the current global rank vector.
///
/// For every local source `s` with out-degree `k > 0`, `rank[s] * d / k` is
/// added to each of its targets. Dangling sources instead add
/// `rank[s] * d / N` to the dangling share.
pub fn aggregate(ranks: &[f64], partition: &Partition, damping_factor: f64) -> LocalContribution {
    let n = ranks.len();
    let mut contribution = vec![0.0; n];
    let mut dangling = 0.0;

    for (idx, &source) in partition.sources().iter().enumerate() {
        let rank = ranks[source as usize];
        let out_degree = partition.out_degree(idx);

        if out_degree == 0 {
            dangling += rank * damping_factor / n as f64;
        } else {
            let share = rank * damping_factor / out_degree as f64;
            for &target in partition.successors(idx) {
                contribution[target as usize] += share;
            }
        }
    }

    LocalContribution { contribution, dangling }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_split_by_out_degree() {
        let partition = Partition::from_entries(vec![(1, &[0u32, 2][..])]);
        let ranks = vec![0.25, 0.5, 0.25];

        let local = aggregate(&ranks, &partition, 0.8);

        assert_eq!(local.contribution, vec![0.5 * 0.8 / 2.0, 0.0, 0.5 * 0.8 / 2.0]);
        assert_eq!(local.dangling, 0.0);
    }

    #[test]
    fn test_dangling_source_pushes_nothing() {
        let partition = Partition::from_entries(vec![(0, &[][..]), (2, &[1u32][..])]);
        let ranks = vec![0.4, 0.3, 0.3];

        let local = aggregate(&ranks, &partition, 0.85);

        // Node 0 is dangling: no target receives its mass directly
        assert_eq!(local.contribution[0], 0.0);
        assert_eq!(local.contribution[2], 0.0);
        assert_eq!(local.contribution[1], 0.3 * 0.85);
        assert_eq!(local.dangling, 0.4 * 0.85 / 3.0);
    }

    #[test]
    fn test_empty_partition_contributes_nothing() {
        let local = aggregate(&[0.5, 0.5], &Partition::new(), 0.85);
        assert_eq!(local.contribution, vec![0.0, 0.0]);
        assert_eq!(local.dangling, 0.0);
    }

    #[test]
    fn test_duplicate_targets_accumulate() {
        let partition = Partition::from_entries(vec![(0, &[1u32, 1][..])]);
        let local = aggregate(&[1.0, 0.0], &partition, 1.0);
        assert_eq!(local.contribution, vec![0.0, 1.0]);
    }
}
