//! Random graph builders over dense agent ids.
//!
//! Both builders return plain edge lists ready for network construction
//! and draw every random decision from the caller's generator, so a seed
//! pins the topology. No hash-iteration order touches the output.

use std::collections::HashSet;

use belief_core::Edge;
use rand::Rng;

/// Small-world graph: a ring lattice with a single rewiring pass.
///
/// Each node joins its `k / 2` nearest neighbors on each side (odd `k`
/// behaves as `k - 1`), then every lattice edge is retargeted with
/// probability `p`: the lower endpoint is kept and the other end moves to
/// a uniformly random node, rejecting self-loops and existing edges with
/// a bounded retry. Produces `n * (k / 2)` edges at the default weight.
/// Degenerate parameters (`n == 0` or `k < 2`) yield an empty list.
pub fn watts_strogatz(n: u32, k: u32, p: f64, rng: &mut impl Rng) -> Vec<Edge> {
    let half_k = k / 2;
    if n == 0 || half_k == 0 {
        return Vec::new();
    }

    let capacity = n as usize * half_k as usize;
    let mut edges: Vec<(u32, u32)> = Vec::with_capacity(capacity);
    let mut present: HashSet<(u32, u32)> = HashSet::with_capacity(capacity);

    for i in 0..n {
        for j in 1..=half_k {
            let neighbor = (i + j) % n;
            // Wrap collisions at k >= n would self-loop or duplicate.
            if neighbor != i && present.insert(ordered(i, neighbor)) {
                edges.push((i, neighbor));
            }
        }
    }

    // One rewiring pass over the lattice edges in construction order.
    for idx in 0..edges.len() {
        if rng.gen::<f64>() >= p {
            continue;
        }
        let (source, old_target) = edges[idx];
        let mut attempts = 0;
        while attempts < n {
            let new_target = rng.gen_range(0..n);
            if new_target != source && !present.contains(&ordered(source, new_target)) {
                present.remove(&ordered(source, old_target));
                present.insert(ordered(source, new_target));
                edges[idx] = (source, new_target);
                break;
            }
            attempts += 1;
        }
    }

    edges.into_iter().map(|(a, b)| Edge::new(a, b)).collect()
}

/// Scale-free graph via preferential attachment.
///
/// Starts from `m` isolated nodes; each node from `m` up attaches to `m`
/// distinct existing nodes sampled in proportion to their degree (the
/// first source therefore attaches to all of `0..m`). Produces
/// `(n - m) * m` edges at the default weight. Degenerate parameters
/// (`n == 0`, `m == 0`, or `m >= n`) yield an empty list.
pub fn barabasi_albert(n: u32, m: u32, rng: &mut impl Rng) -> Vec<Edge> {
    if n == 0 || m == 0 || m >= n {
        return Vec::new();
    }

    let mut edges = Vec::with_capacity((n - m) as usize * m as usize);
    // Endpoint multiset; uniform index sampling is degree-proportional.
    let mut repeated: Vec<u32> = Vec::new();
    let mut targets: Vec<u32> = (0..m).collect();

    for source in m..n {
        for &target in &targets {
            edges.push(Edge::new(source, target));
            repeated.push(source);
            repeated.push(target);
        }

        let mut next = Vec::with_capacity(m as usize);
        while next.len() < m as usize {
            let candidate = repeated[rng.gen_range(0..repeated.len())];
            if !next.contains(&candidate) {
                next.push(candidate);
            }
        }
        targets = next;
    }

    edges
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
