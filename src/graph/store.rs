//! In-memory adjacency storage, loaded once by the coordinator
//!
//! Input format: one line per source node, `source target1 ... targetK`,
//! whitespace separated. A line without targets marks a dangling node.

use indexmap::IndexMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};
use webrank_algorithms::{NodeId, Partition};

/// Errors that can occur while loading a graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("{at}: node {node} is outside 0..{node_count}")]
    NodeOutOfRange {
        at: Position,
        node: NodeId,
        node_count: usize,
    },

    #[error("Graph has {0} nodes, more than int32 ids can address")]
    TooManyNodes(usize),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Where an adjacency record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based line of an input file
    Line(usize),
    /// 1-based index into a programmatic adjacency list
    Entry(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(n) => write!(f, "Line {}", n),
            Position::Entry(n) => write!(f, "Entry {}", n),
        }
    }
}

/// Whole-graph adjacency, owned by the coordinator.
///
/// Sources are enumerated in first-seen order. That order is fixed at load
/// time and defines the contiguous blocks handed to workers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStore {
    adjacency: IndexMap<NodeId, Vec<NodeId>>,
}

impl GraphStore {
    /// Load a graph from a file
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} nodes and {} edges from {}",
            store.node_count(),
            store.edge_count(),
            path.display()
        );
        Ok(store)
    }

    /// Parse a graph from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> GraphResult<Self> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some((source, targets)) = parse_line(idx + 1, &line)? {
                records.push((Position::Line(idx + 1), source, targets));
            }
        }
        Self::build(records)
    }

    /// Build a graph from `(source, targets)` pairs, validating ids
    pub fn from_adjacency<I>(entries: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (NodeId, Vec<NodeId>)>,
    {
        let records = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (source, targets))| (Position::Entry(idx + 1), source, targets))
            .collect();
        Self::build(records)
    }

    fn build(records: Vec<(Position, NodeId, Vec<NodeId>)>) -> GraphResult<Self> {
        // Positions ride along until validation is done
        let mut entries: IndexMap<NodeId, (Position, Vec<NodeId>)> =
            IndexMap::with_capacity(records.len());

        for (at, source, targets) in records {
            if entries.insert(source, (at, targets)).is_some() {
                warn!(
                    "{}: duplicate source {} replaces its earlier adjacency list",
                    at, source
                );
            }
        }

        let node_count = entries.len();
        if node_count > i32::MAX as usize {
            return Err(GraphError::TooManyNodes(node_count));
        }

        for (source, (at, targets)) in &entries {
            for &node in std::iter::once(source).chain(targets) {
                if node as usize >= node_count {
                    return Err(GraphError::NodeOutOfRange {
                        at: *at,
                        node,
                        node_count,
                    });
                }
            }
        }

        let adjacency = entries
            .into_iter()
            .map(|(source, (_, targets))| (source, targets))
            .collect();
        Ok(Self { adjacency })
    }

    /// Number of nodes (distinct sources)
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of out-links
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Targets of `source`, if it is a known source
    pub fn targets(&self, source: NodeId) -> Option<&[NodeId]> {
        self.adjacency.get(&source).map(Vec::as_slice)
    }

    /// Iterate `(source, targets)` in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.adjacency
            .iter()
            .map(|(&source, targets)| (source, targets.as_slice()))
    }

    /// Slice out the sources at positions `range` of the enumeration order
    pub fn partition(&self, range: Range<usize>) -> Partition {
        let mut partition = Partition::new();
        for position in range {
            if let Some((&source, targets)) = self.adjacency.get_index(position) {
                partition.push(source, targets);
            }
        }
        partition
    }

    /// The whole graph as a single partition
    pub fn to_partition(&self) -> Partition {
        self.partition(0..self.node_count())
    }
}

/// Parse one input line. Blank lines yield `None`.
fn parse_line(line: usize, text: &str) -> GraphResult<Option<(NodeId, Vec<NodeId>)>> {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };

    let parse = |token: &str| {
        token.parse::<NodeId>().map_err(|_| GraphError::Malformed {
            line,
            reason: format!("invalid node id '{}'", token),
        })
    };

    let source = parse(first)?;
    let targets = tokens.map(parse).collect::<GraphResult<Vec<_>>>()?;
    Ok(Some((source, targets)))
}
