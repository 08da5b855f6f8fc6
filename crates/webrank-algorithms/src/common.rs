//! Shared types for rank computation
//!
//! Provides a compact, read-only view of a worker's share of the adjacency data.

/// Node identifier type (dense index into the rank vector)
pub type NodeId = u32;

/// A worker's local slice of the graph in Compressed Sparse Row (CSR) format.
///
/// Sources are kept in the order they were assigned, which is the
/// coordinator's enumeration order of the full graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Local source node ids, in assignment order
    sources: Vec<NodeId>,
    /// Offsets into `targets`. Size = sources.len() + 1
    offsets: Vec<usize>,
    /// Contiguous array of target node ids
    targets: Vec<NodeId>,
}

impl Partition {
    /// Create an empty partition
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            offsets: vec![0],
            targets: Vec::new(),
        }
    }

    /// Append one adjacency entry. An empty `targets` slice marks a dangling source.
    pub fn push(&mut self, source: NodeId, targets: &[NodeId]) {
        self.sources.push(source);
        self.targets.extend_from_slice(targets);
        self.offsets.push(self.targets.len());
    }

    /// Build a partition from `(source, targets)` pairs
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, &'a [NodeId])>,
    {
        let mut partition = Self::new();
        for (source, targets) in entries {
            partition.push(source, targets);
        }
        partition
    }

    /// Number of local sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of local out-links
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Local source ids in assignment order
    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    /// Out-degree of the `idx`-th local source
    pub fn out_degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Targets of the `idx`-th local source
    pub fn successors(&self, idx: usize) -> &[NodeId] {
        &self.targets[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Iterate over `(source, targets)` in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.sources
            .iter()
            .enumerate()
            .map(move |(idx, &source)| (source, self.successors(idx)))
    }

    /// Number of local dangling sources
    pub fn dangling_count(&self) -> usize {
        (0..self.len()).filter(|&idx| self.out_degree(idx) == 0).count()
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self::new()
    }
}
