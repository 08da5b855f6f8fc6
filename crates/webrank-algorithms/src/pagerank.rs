//! PageRank arithmetic shared by the distributed engine, plus a single-process
//! reference implementation used as a correctness oracle.

use super::common::Partition;

/// PageRank configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Number of iterations; there is no convergence check
    pub iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 10,
        }
    }
}

/// Uniform starting vector `1/N`
pub fn initial_ranks(node_count: usize) -> Vec<f64> {
    if node_count == 0 {
        return Vec::new();
    }
    vec![1.0 / node_count as f64; node_count]
}

/// Build the next rank vector from globally summed contributions.
///
/// `new[k] = summed[k] + (1 - d) / N + dangling`, where `dangling` is the
/// global dangling mass already divided by `N`.
///
/// Evaluated left to right as `(summed[k] + jump) + dangling`. Grouping the
/// two uniform terms first can differ in the last bit.
pub fn combine(summed: &[f64], dangling: f64, damping_factor: f64) -> Vec<f64> {
    let jump = (1.0 - damping_factor) / summed.len() as f64;
    summed.iter().map(|&mass| mass + jump + dangling).collect()
}

/// Single-process PageRank over the whole graph.
///
/// Uses the textbook update `(1 - d)/N + d * (transferred + dangling/N)`,
/// which is algebraically the same as the distributed formulation but rounds
/// differently; compare with a tolerance.
pub fn page_rank(graph: &Partition, node_count: usize, config: PageRankConfig) -> Vec<f64> {
    let n = node_count;
    if n == 0 {
        return Vec::new();
    }

    let mut scores = initial_ranks(n);
    let mut transferred = vec![0.0; n];
    let d = config.damping_factor;

    for _ in 0..config.iterations {
        transferred.iter_mut().for_each(|t| *t = 0.0);
        let mut dangling = 0.0;

        for (idx, &source) in graph.sources().iter().enumerate() {
            let out_degree = graph.out_degree(idx);
            let score = scores[source as usize];
            if out_degree == 0 {
                dangling += score;
            } else {
                for &target in graph.successors(idx) {
                    transferred[target as usize] += score / out_degree as f64;
                }
            }
        }

        let dangling_each = dangling / n as f64;
        for (score, &incoming) in scores.iter_mut().zip(&transferred) {
            *score = (1.0 - d) / n as f64 + d * (incoming + dangling_each);
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::common::NodeId;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample_graph() -> Partition {
        Partition::from_entries(vec![
            (0, &[][..]),
            (1, &[2u32][..]),
            (2, &[1u32][..]),
            (3, &[0u32, 1][..]),
            (4, &[1u32, 3, 5][..]),
            (5, &[1u32, 4][..]),
        ])
    }

    #[test]
    fn test_initial_ranks_uniform() {
        assert_eq!(initial_ranks(4), vec![0.25; 4]);
        assert!(initial_ranks(0).is_empty());
    }

    #[test]
    fn test_mass_conserved_without_dangling() {
        // Cycle 0 -> 1 -> 2 -> 0 with a non-uniform start
        let graph = Partition::from_entries(vec![
            (0, &[1u32][..]),
            (1, &[2u32][..]),
            (2, &[0u32, 1][..]),
        ]);
        let old = vec![0.2, 0.3, 0.4];
        let d = 0.85;

        let local = aggregate(&old, &graph, d);
        let next = combine(&local.contribution, local.dangling, d);

        let old_sum: f64 = old.iter().sum();
        let new_sum: f64 = next.iter().sum();
        assert!((new_sum - (d * old_sum + (1.0 - d))).abs() < 1e-12);
    }

    #[test]
    fn test_mass_conserved_with_dangling() {
        let graph = sample_graph();
        let mut ranks = initial_ranks(6);

        for _ in 0..25 {
            let local = aggregate(&ranks, &graph, 0.85);
            ranks = combine(&local.contribution, local.dangling, 0.85);
            let sum: f64 = ranks.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum drifted to {}", sum);
        }
    }

    #[test]
    fn test_reference_matches_distributed_formula() {
        let graph = sample_graph();
        let config = PageRankConfig { damping_factor: 0.85, iterations: 10 };

        let reference = page_rank(&graph, 6, config);

        let mut ranks = initial_ranks(6);
        for _ in 0..config.iterations {
            let local = aggregate(&ranks, &graph, config.damping_factor);
            ranks = combine(&local.contribution, local.dangling, config.damping_factor);
        }

        for (a, b) in reference.iter().zip(&ranks) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reference_matches_distributed_formula_on_random_graphs() {
        let config = PageRankConfig { damping_factor: 0.85, iterations: 30 };

        for seed in 0..5u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let n = rng.gen_range(1..80usize);

            let mut adjacency = Vec::with_capacity(n);
            for source in 0..n as NodeId {
                let degree: usize = rng.gen_range(0..5);
                let targets: Vec<NodeId> =
                    (0..degree).map(|_| rng.gen_range(0..n as NodeId)).collect();
                adjacency.push((source, targets));
            }
            let graph = Partition::from_entries(
                adjacency.iter().map(|(source, targets)| (*source, targets.as_slice())),
            );

            let reference = page_rank(&graph, n, config);
            let mut ranks = initial_ranks(n);
            for _ in 0..config.iterations {
                let local = aggregate(&ranks, &graph, config.damping_factor);
                ranks = combine(&local.contribution, local.dangling, config.damping_factor);
            }

            for (a, b) in reference.iter().zip(&ranks) {
                assert!((a - b).abs() < 1e-12, "seed {}: {} vs {}", seed, a, b);
            }
            let sum: f64 = ranks.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reference_empty_graph() {
        assert!(page_rank(&Partition::new(), 0, PageRankConfig::default()).is_empty());
    }
}
