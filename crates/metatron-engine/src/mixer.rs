//! The mixing engine: one repetition over the whole graph.
//!
//! For every node, in ascending id order, a transient buffer is built from
//! the data slots of its neighbours (in neighbour-list order) followed by
//! the decimal text of the shared counter, which is then incremented. One
//! [`Mixer::mix`] call therefore advances the counter by
//! [`NODE_COUNT`](metatron_core::constants::NODE_COUNT).
//!
//! Mixing only reads data slots (the graph is borrowed immutably), so the
//! transient for a node never depends on traversal order.

use std::hint::black_box;

use metatron_core::graph::Graph;

/// Append the decimal digits of `n` to `out` without allocating.
fn push_decimal(out: &mut Vec<u8>, mut n: u64) {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    out.extend_from_slice(&buf[pos..]);
}

/// Build the transient mix output for node `id` at `counter` into `out`.
pub fn transient_into(graph: &Graph, id: usize, counter: u64, out: &mut Vec<u8>) {
    out.clear();
    if let Some(node) = graph.node(id) {
        for &n in node.neighbors() {
            out.extend_from_slice(graph.data(n));
        }
    }
    push_decimal(out, counter);
}

/// Transient mix output for node `id` at `counter`.
pub fn transient(graph: &Graph, id: usize, counter: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(graph.neighborhood_len(id) + 20);
    transient_into(graph, id, counter, &mut out);
    out
}

/// Reusable mixing state. Keeps one scratch buffer across repetitions.
#[derive(Debug, Default)]
pub struct Mixer {
    scratch: Vec<u8>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the scratch buffer for the largest neighbourhood of `graph`.
    pub fn for_graph(graph: &Graph) -> Self {
        let widest = graph
            .nodes()
            .iter()
            .map(|n| graph.neighborhood_len(n.id()))
            .max()
            .unwrap_or(0);
        Self {
            scratch: Vec::with_capacity(widest + 20),
        }
    }

    /// One repetition over every node. Advances `counter` once per node.
    pub fn mix(&mut self, graph: &Graph, counter: &mut u64) {
        for node in graph.nodes() {
            transient_into(graph, node.id(), *counter, &mut self.scratch);
            black_box(&self.scratch);
            *counter += 1;
        }
    }
}

/// One repetition with a throwaway scratch buffer.
pub fn mix(graph: &Graph, counter: &mut u64) {
    Mixer::new().mix(graph, counter);
}
