//! Golden-ratio partition allocator.
//!
//! The payload is first repeated end-to-end until it covers the byte budget.
//! Node `i` then receives `floor(budget / phi^(i+1))` bytes, clamped to what
//! is left of the budget, so each node holds roughly `1/phi` of its
//! predecessor. Since `sum(1/phi^k) > 1`, the budget is exhausted after the
//! first few nodes and the outer ring usually ends up empty.
//!
//! Chunks are cut from the source with a sequential cursor that wraps
//! modulo the source length.

use crate::constants::{NODE_COUNT, PHI};
use crate::graph::Graph;

/// Result of [`allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Concatenation of every node chunk, in node order.
    pub buffer: Vec<u8>,
    /// Whole payload copies needed to reach the budget (always >= 1).
    pub multiplier: u64,
}

/// Repeat `payload` until it is at least `target` bytes long.
///
/// Returns the expanded bytes and the number of copies used. A payload that
/// already meets the target is returned as a single copy. An empty payload
/// cannot grow and is returned as-is with a multiplier of 1.
pub fn expand(payload: &[u8], target: usize) -> (Vec<u8>, u64) {
    if payload.is_empty() {
        return (Vec::new(), 1);
    }
    let copies = target.div_ceil(payload.len()).max(1);
    (payload.repeat(copies), copies as u64)
}

/// Chunk size for every node under a budget of `budget` bytes.
///
/// The sizes always sum to exactly `budget`: anything the clamped
/// golden-ratio schedule leaves unassigned is added to the last node.
pub fn chunk_sizes(budget: usize) -> [usize; NODE_COUNT] {
    let mut sizes = [0usize; NODE_COUNT];
    let mut remaining = budget;
    let mut scale = PHI;

    for size in sizes.iter_mut() {
        let ideal = (budget as f64 / scale) as usize;
        *size = ideal.min(remaining);
        remaining -= *size;
        scale *= PHI;
    }
    sizes[NODE_COUNT - 1] += remaining;
    sizes
}

/// Copy `len` bytes from `source` starting at `start`, wrapping around.
fn circular_slice(source: &[u8], start: usize, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut pos = start % source.len();
    while out.len() < len {
        let take = (len - out.len()).min(source.len() - pos);
        out.extend_from_slice(&source[pos..pos + take]);
        pos = (pos + take) % source.len();
    }
    out
}

/// Load `source` into the graph using the golden-ratio schedule for `budget`.
///
/// Overwrites every data slot. An empty source clears all slots.
pub fn load(graph: &mut Graph, source: &[u8], budget: usize) {
    if source.is_empty() {
        for id in 0..NODE_COUNT {
            graph.set_data(id, Vec::new());
        }
        return;
    }

    let mut cursor = 0usize;
    for (id, size) in chunk_sizes(budget).into_iter().enumerate() {
        graph.set_data(id, circular_slice(source, cursor, size));
        cursor = (cursor + size) % source.len();
    }
}

/// [`load`], then return the concatenation of the chunks in node order.
pub fn populate(graph: &mut Graph, source: &[u8], budget: usize) -> Vec<u8> {
    load(graph, source, budget);
    let mut mixed = Vec::with_capacity(graph.total_bytes());
    for node in graph.nodes() {
        mixed.extend_from_slice(node.data());
    }
    mixed
}

/// Expand `payload` to `target_bytes` and spread it across the graph.
///
/// With `target_bytes == 0` expansion is disabled: the graph is left
/// untouched and the payload is returned unchanged with a multiplier of 1.
pub fn allocate(graph: &mut Graph, payload: &[u8], target_bytes: usize) -> Allocation {
    if target_bytes == 0 {
        return Allocation {
            buffer: payload.to_vec(),
            multiplier: 1,
        };
    }

    let (expanded, multiplier) = expand(payload, target_bytes);
    let buffer = populate(graph, &expanded, target_bytes);
    Allocation { buffer, multiplier }
}
