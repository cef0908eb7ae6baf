//! Graph store: undirected weighted adjacency over dense node ids.
//!
//! The store keeps one vector of (neighbor id, weight) entries per node.
//! The node set is fixed at construction; the sanctioned mutation is edge
//! addition, where re-adding an existing pair overwrites its weight (last
//! write wins). Callers pass ids below `node_count`; the owning network
//! validates endpoints before they reach the store.

use serde::Serialize;

use crate::agent::AgentId;

/// Default weight for edges created without an explicit one.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// One adjacency entry: the neighbor on the other end of an edge and the
/// edge's weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Id of the adjacent node.
    pub id: AgentId,
    /// Weight of the connecting edge.
    pub weight: f64,
}

/// Undirected weighted graph over the dense id space `0..node_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStore {
    adjacency: Vec<Vec<Neighbor>>,
    edge_count: usize,
}

impl GraphStore {
    /// Creates a store with `node_count` nodes and no edges.
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edge_count: 0,
        }
    }

    /// Number of nodes. Fixed for the store's lifetime.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Adds the undirected edge `u -- v`, or overwrites its weight if the
    /// pair is already connected. O(degree).
    pub fn add_edge(&mut self, u: AgentId, v: AgentId, weight: f64) {
        if update_entry(&mut self.adjacency[u.index()], v, weight) {
            update_entry(&mut self.adjacency[v.index()], u, weight);
            return;
        }
        self.adjacency[u.index()].push(Neighbor { id: v, weight });
        self.adjacency[v.index()].push(Neighbor { id: u, weight });
        self.edge_count += 1;
    }

    /// Adjacency entries of `id`, in insertion order. O(1).
    pub fn neighbors(&self, id: AgentId) -> &[Neighbor] {
        &self.adjacency[id.index()]
    }

    /// Whether `u` and `v` are connected.
    pub fn has_edge(&self, u: AgentId, v: AgentId) -> bool {
        self.adjacency[u.index()].iter().any(|nb| nb.id == v)
    }

    /// Weight of the edge `u -- v`, or [`DEFAULT_EDGE_WEIGHT`] when the
    /// pair is not connected.
    pub fn weight(&self, u: AgentId, v: AgentId) -> f64 {
        self.adjacency[u.index()]
            .iter()
            .find(|nb| nb.id == v)
            .map(|nb| nb.weight)
            .unwrap_or(DEFAULT_EDGE_WEIGHT)
    }

    /// Number of edges incident to `id`.
    pub fn degree(&self, id: AgentId) -> usize {
        self.adjacency[id.index()].len()
    }

    /// Lazy iterator over all edges as `(u, v, weight)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, entries)| {
            let u = AgentId(u as u32);
            entries
                .iter()
                .filter(move |nb| u < nb.id)
                .map(move |nb| (u, nb.id, nb.weight))
        })
    }
}

/// Overwrites the weight of the entry pointing at `id`, if present.
fn update_entry(entries: &mut [Neighbor], id: AgentId, weight: f64) -> bool {
    match entries.iter_mut().find(|nb| nb.id == id) {
        Some(nb) => {
            nb.weight = weight;
            true
        }
        None => false,
    }
}
