use std::ops::Range;

use rustc_hash::FxHashSet;

/// A half-edge stored in the adjacency list of one endpoint. Its twin lives
/// in the adjacency list of `target` at index `reverse`.
#[derive(Clone, Copy, Debug)]
struct HalfEdge {
    target: usize,
    weight: i64,
    reverse: usize,
}

/// A super-node holding the original vertex ids merged into it.
#[derive(Clone, Debug, Default)]
struct Node {
    contained: Vec<usize>,
    edges: Vec<HalfEdge>,
}

/// Struct that represents a weighted undirected graph supporting destructive
/// vertex contraction.
///
/// Every node is a super-node carrying the list of original vertices merged
/// into it, and `position` maps each original vertex to the super-node that
/// currently holds it (`None` once the vertex has been removed from the
/// graph). Edges are stored as index-linked half-edge twins so that deletion
/// and contraction stay O(degree). After any contraction the graph contains
/// no self-loops and at most one edge per node pair, with parallel weights
/// summed.
#[derive(Clone, Debug)]
pub struct MutableGraph {
    nodes: Vec<Node>,
    position: Vec<Option<usize>>,
}

impl MutableGraph {
    /// Create a graph of `num_nodes` super-nodes, each holding exactly the
    /// original vertex of the same id. Edges are added with `new_edge`.
    pub fn start_construction(num_nodes: usize) -> Self {
        Self {
            nodes: (0..num_nodes)
                .map(|v| Node {
                    contained: vec![v],
                    edges: Vec::new(),
                })
                .collect(),
            position: (0..num_nodes).map(Some).collect(),
        }
    }

    /// The number of super-nodes currently in the graph.
    pub fn n(&self) -> usize {
        self.nodes.len()
    }

    /// An iterator over the current super-node ids.
    pub fn nodes(&self) -> Range<usize> {
        0..self.nodes.len()
    }

    /// True if the super-node holds no original vertices. Such nodes act as
    /// tombstones until they are removed or refilled.
    pub fn is_empty_node(&self, n: usize) -> bool {
        self.nodes[n].contained.is_empty()
    }

    /// The number of edges currently incident to `n`.
    pub fn degree(&self, n: usize) -> usize {
        self.nodes[n].edges.len()
    }

    /// The sum of the weights of all edges incident to `n`.
    pub fn weighted_degree(&self, n: usize) -> i64 {
        self.nodes[n].edges.iter().map(|e| e.weight).sum()
    }

    /// An iterator over the edge ids of `n`.
    pub fn edges_of(&self, n: usize) -> Range<usize> {
        0..self.nodes[n].edges.len()
    }

    /// The target and weight of edge `e` of node `n`.
    pub fn edge(&self, n: usize, e: usize) -> (usize, i64) {
        let half = &self.nodes[n].edges[e];
        (half.target, half.weight)
    }

    pub fn edge_target(&self, n: usize, e: usize) -> usize {
        self.nodes[n].edges[e].target
    }

    pub fn edge_weight(&self, n: usize, e: usize) -> i64 {
        self.nodes[n].edges[e].weight
    }

    /// The index of the twin half-edge in the target's adjacency list.
    pub fn reverse_edge(&self, n: usize, e: usize) -> usize {
        self.nodes[n].edges[e].reverse
    }

    /// The id of the edge from `u` to `v`, if one exists.
    pub fn find_edge(&self, u: usize, v: usize) -> Option<usize> {
        self.nodes[u].edges.iter().position(|half| half.target == v)
    }

    /// Set the weight of edge `e` of node `n` on both half-edges.
    pub fn set_edge_weight(&mut self, n: usize, e: usize, weight: i64) {
        let HalfEdge { target, reverse, .. } = self.nodes[n].edges[e];
        self.nodes[n].edges[e].weight = weight;
        self.nodes[target].edges[reverse].weight = weight;
    }

    /// The original vertices currently merged into `n`.
    pub fn contained_vertices(&self, n: usize) -> &[usize] {
        &self.nodes[n].contained
    }

    /// Replace the contained list of `n`. The position map is not touched;
    /// callers redirect the affected original vertices themselves.
    pub fn set_contained_vertices(&mut self, n: usize, contained: Vec<usize>) {
        self.nodes[n].contained = contained;
    }

    /// The super-node currently holding original vertex `v`, or `None` if
    /// the vertex has been removed from the graph.
    pub fn current_position(&self, v: usize) -> Option<usize> {
        self.position[v]
    }

    pub fn set_current_position(&mut self, v: usize, pos: Option<usize>) {
        self.position[v] = pos;
    }

    /// Append a fresh super-node with no contained vertices and no edges.
    pub fn new_empty_node(&mut self) -> usize {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    /// Insert an undirected edge between `u` and `v` as a twin pair of
    /// half-edges. The caller guarantees that no `u`-`v` edge exists yet.
    pub fn new_edge(&mut self, u: usize, v: usize, weight: i64) {
        debug_assert_ne!(u, v);
        debug_assert!(self.find_edge(u, v).is_none());
        let eu = self.nodes[u].edges.len();
        let ev = self.nodes[v].edges.len();
        self.nodes[u].edges.push(HalfEdge {
            target: v,
            weight,
            reverse: ev,
        });
        self.nodes[v].edges.push(HalfEdge {
            target: u,
            weight,
            reverse: eu,
        });
    }

    /// Remove edge `e` of node `n` together with its twin.
    pub fn delete_edge(&mut self, n: usize, e: usize) {
        let HalfEdge { target, reverse, .. } = self.nodes[n].edges[e];
        self.remove_half_edge(target, reverse);
        self.remove_half_edge(n, e);
    }

    // Swap-remove a single half-edge and repair the twin index of the
    // half-edge that took its slot.
    fn remove_half_edge(&mut self, n: usize, e: usize) {
        let last = self.nodes[n].edges.len() - 1;
        self.nodes[n].edges.swap_remove(e);
        if e < last {
            let HalfEdge { target, reverse, .. } = self.nodes[n].edges[e];
            self.nodes[target].edges[reverse].reverse = e;
        }
    }

    /// Contract edge `e` of node `u`: the edge's target is merged into `u`,
    /// parallel edges are collapsed with summed weights and the would-be
    /// self-loop is dropped. The merged-away slot is refilled by the last
    /// node, so callers must re-resolve ids through `current_position`.
    pub fn contract_edge(&mut self, u: usize, e: usize) {
        let v = self.nodes[u].edges[e].target;
        self.merge_into(u, v);
    }

    /// Contract all super-nodes of `set` into its lowest member. Members do
    /// not need to be pairwise adjacent.
    pub fn contract_vertex_set(&mut self, set: &FxHashSet<usize>) {
        if set.len() < 2 {
            return;
        }
        let mut members: Vec<usize> = set.iter().copied().collect();
        members.sort_unstable();
        let mut rep = members[0];
        let mut pending = members.split_off(1);
        // Merge the highest remaining id first so that at most one pending
        // member is renumbered by each swap-remove.
        while let Some(m) = pending.pop() {
            let last = self.nodes.len() - 1;
            self.merge_into(rep, m);
            if m != last {
                // node `last` now lives in slot m
                if rep == last {
                    rep = m;
                }
                for p in pending.iter_mut() {
                    if *p == last {
                        *p = m;
                    }
                }
            }
        }
    }

    // Merge node v into node u: contained vertices are appended, v's edges
    // are re-attached to u with parallel weights summed, the u-v edge
    // vanishes as a self-loop, and v's slot is refilled by the last node.
    fn merge_into(&mut self, u: usize, v: usize) {
        debug_assert_ne!(u, v);
        let contained = std::mem::take(&mut self.nodes[v].contained);
        for &c in &contained {
            self.position[c] = Some(u);
        }
        self.nodes[u].contained.extend(contained);

        while !self.nodes[v].edges.is_empty() {
            let e = self.nodes[v].edges.len() - 1;
            let (target, weight) = self.edge(v, e);
            self.delete_edge(v, e);
            if target == u {
                continue;
            }
            if let Some(existing) = self.find_edge(u, target) {
                let new_weight = self.nodes[u].edges[existing].weight + weight;
                self.set_edge_weight(u, existing, new_weight);
            } else {
                self.new_edge(u, target, weight);
            }
        }
        self.remove_node_slot(v);
    }

    /// Remove super-node `n` from the graph entirely. Its contained original
    /// vertices lose their position and all incident edges are deleted.
    pub fn delete_vertex(&mut self, n: usize) {
        let contained = std::mem::take(&mut self.nodes[n].contained);
        for c in contained {
            self.position[c] = None;
        }
        while !self.nodes[n].edges.is_empty() {
            let e = self.nodes[n].edges.len() - 1;
            self.delete_edge(n, e);
        }
        self.remove_node_slot(n);
    }

    // Swap-remove an edgeless, drained node slot and redirect the position
    // map and twin half-edges of the node that took its place.
    fn remove_node_slot(&mut self, n: usize) {
        debug_assert!(self.nodes[n].edges.is_empty());
        debug_assert!(self.nodes[n].contained.is_empty());
        let last = self.nodes.len() - 1;
        self.nodes.swap_remove(n);
        if n < last {
            for i in 0..self.nodes[n].contained.len() {
                let c = self.nodes[n].contained[i];
                self.position[c] = Some(n);
            }
            for e in 0..self.nodes[n].edges.len() {
                let HalfEdge { target, reverse, .. } = self.nodes[n].edges[e];
                self.nodes[target].edges[reverse].target = n;
            }
        }
    }
}
