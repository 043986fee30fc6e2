//! The Metatron's Cube graph.
//!
//! Thirteen nodes arranged as the circles of Metatron's Cube: node 0 is the
//! centre, nodes 1..=6 form the inner hexagon and nodes 7..=12 the outer one.
//! The adjacency is a literal table. Edges are directed: a node mixes in the
//! slots it lists, and nothing requires the listed node to list it back.
//!
//! Nodes are stored densely by id, so lookups never hash or allocate. Only
//! the data slot of a node is mutable, and only through
//! [`Graph::set_data`]; the neighbour lists are `'static`.

use crate::constants::NODE_COUNT;

/// Hard-coded neighbour lists, indexed by node id.
pub const ADJACENCY: [&[usize]; NODE_COUNT] = [
    &[1, 2, 3, 4, 5, 6],
    &[0, 2, 3, 4, 5, 6, 7, 8],
    &[0, 1, 3, 4, 5, 6, 9, 10],
    &[0, 1, 2, 4, 5, 6, 11, 12],
    &[0, 1, 2, 3, 5, 6, 7, 10],
    &[0, 1, 2, 3, 4, 6, 8, 9],
    &[0, 1, 2, 3, 4, 5, 11, 12],
    &[1, 4, 8, 9, 10, 11, 12],
    &[1, 5, 7, 9, 10, 11, 12],
    &[2, 5, 7, 8, 10, 11, 12],
    &[2, 4, 7, 8, 9, 11, 12],
    &[3, 6, 7, 8, 9, 10, 12],
    &[3, 6, 7, 8, 9, 10, 11],
];

/// One circle of the cube: a data slot plus its fixed neighbour list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: usize,
    data: Vec<u8>,
    neighbors: &'static [usize],
}

impl GraphNode {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current contents of the data slot.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Neighbour ids in mixing order.
    pub fn neighbors(&self) -> &'static [usize] {
        self.neighbors
    }
}

/// The full 13-node graph, owned by a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    nodes: [GraphNode; NODE_COUNT],
}

impl Graph {
    /// Build the fixed topology with every data slot empty.
    pub fn new() -> Self {
        Self {
            nodes: std::array::from_fn(|id| GraphNode {
                id,
                data: Vec::new(),
                neighbors: ADJACENCY[id],
            }),
        }
    }

    /// Look up a node by id. Returns `None` for ids outside `0..NODE_COUNT`.
    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Data slot of node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= NODE_COUNT`. Every id in [`ADJACENCY`] is in range.
    pub fn data(&self, id: usize) -> &[u8] {
        &self.nodes[id].data
    }

    /// Overwrite the data slot of node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= NODE_COUNT`.
    pub fn set_data(&mut self, id: usize, data: Vec<u8>) {
        self.nodes[id].data = data;
    }

    /// Total bytes held across all data slots.
    pub fn total_bytes(&self) -> usize {
        self.nodes.iter().map(|n| n.data.len()).sum()
    }

    /// Concatenated length of the neighbour slots of node `id`.
    pub fn neighborhood_len(&self, id: usize) -> usize {
        self.nodes[id]
            .neighbors
            .iter()
            .map(|&n| self.nodes[n].data.len())
            .sum()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the fixed 13-node Metatron's Cube with empty data slots.
pub fn build_graph() -> Graph {
    Graph::new()
}
