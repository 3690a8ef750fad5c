use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::MutableGraph;

/// Record of a removed degree-1 super-node whose single edge had weight
/// equal to the minimum cut. `neighbor` is the first contained original of
/// the super-node it was attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendantEdge {
    pub neighbor: usize,
    pub contained: Vec<usize>,
}

/// Record of a contracted degree-2 super-node whose two edges each carried
/// half the minimum cut. `endpoints` are the first contained originals of
/// the two neighbors at contraction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleVertex {
    pub endpoints: (usize, usize),
    pub contained: Vec<usize>,
}

/// Reduces a graph with known minimum cut by contracting structures that
/// cannot take part in any further minimum cut, while logging the removed
/// cactus structures so they can be re-inserted later in reverse order.
pub struct HeavyEdgeReducer {
    mincut: i64,
}

impl HeavyEdgeReducer {
    pub fn new(mincut: i64) -> Self {
        Self { mincut }
    }

    /// Contract the endpoints of every edge heavier than the minimum cut
    /// and strip degree-1 super-nodes whose single edge has exactly the
    /// minimum cut weight. The stripped pendants are returned in removal
    /// order for `re_insert_vertices`.
    ///
    /// An edge heavier than the mincut cannot cross any minimum cut, so its
    /// endpoints lie on the same side of every one of them and may be
    /// merged. A mincut-weight pendant represents exactly one trivial
    /// minimum cut and is encoded as a single cactus tree edge instead.
    pub fn remove_heavy_edges(&self, graph: &mut MutableGraph) -> Vec<PendantEdge> {
        let mut cactus_edges = Vec::new();
        let mut contract: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        let mut mark_for_cactus = Vec::new();

        for n in graph.nodes() {
            if graph.is_empty_node(n) {
                continue;
            }
            for e in graph.edges_of(n) {
                let (target, wgt) = graph.edge(n, e);
                if graph.is_empty_node(target) {
                    continue;
                }

                if wgt > self.mincut {
                    // Key the contraction group by the smaller first
                    // contained original; it survives any renumbering.
                    let v1 = graph.contained_vertices(n)[0];
                    let v2 = graph.contained_vertices(target)[0];
                    contract.entry(v1.min(v2)).or_default().push(v1.max(v2));
                }

                if wgt == self.mincut && graph.degree(n) == 1 {
                    // each edge is seen from both adjacent nodes
                    // so we get all edges
                    mark_for_cactus.push(graph.contained_vertices(n)[0]);
                }
            }
        }

        for (lowest, others) in &contract {
            let mut vtxset = FxHashSet::default();
            if let Some(pos) = graph.current_position(*lowest) {
                vtxset.insert(pos);
            }
            for &v in others {
                if let Some(pos) = graph.current_position(v) {
                    vtxset.insert(pos);
                }
            }
            if vtxset.len() > 1 {
                graph.contract_vertex_set(&vtxset);
            }
        }

        for &marked in &mark_for_cactus {
            if graph.n() > 2 {
                let Some(n) = graph.current_position(marked) else {
                    continue;
                };
                if graph.degree(n) != 1 {
                    continue;
                }
                let t = graph.edge_target(n, 0);
                if graph.is_empty_node(t) {
                    continue;
                }
                let neighbor = graph.contained_vertices(t)[0];
                cactus_edges.push(PendantEdge {
                    neighbor,
                    contained: graph.contained_vertices(n).to_vec(),
                });
                graph.delete_vertex(n);
            }
        }
        cactus_edges
    }

    /// Contract every degree-2 super-node whose weighted degree equals the
    /// minimum cut with both edges at exactly half of it. Such a node sits
    /// on a 3-cycle of the cactus representation and is re-expanded by
    /// `re_insert_cycles`.
    pub fn contract_cycle_edges(&self, graph: &mut MutableGraph) -> Vec<CycleVertex> {
        let mut cycle_edges = Vec::new();
        let half = self.mincut / 2;
        // contractions shrink the graph, so the bound is re-read every pass
        let mut n = 0;
        while n < graph.n() {
            if graph.degree(n) == 2 && graph.weighted_degree(n) == self.mincut {
                let n0 = graph.edge_target(n, 0);
                let n1 = graph.edge_target(n, 1);
                // if the edges have different weights, the heavier of them
                // will be contracted in local routines
                if !graph.is_empty_node(n0)
                    && !graph.is_empty_node(n1)
                    && graph.edge_weight(n, 0) == half
                    && graph.edge_weight(n, 1) == half
                {
                    let p0 = graph.contained_vertices(n0)[0];
                    let p1 = graph.contained_vertices(n1)[0];
                    let contained = graph.contained_vertices(n).to_vec();
                    graph.set_contained_vertices(n, Vec::new());
                    for &c in &contained {
                        graph.set_current_position(c, None);
                    }
                    let reverse = graph.reverse_edge(n, 0);
                    graph.contract_edge(n0, reverse);
                    cycle_edges.push(CycleVertex {
                        endpoints: (p0, p1),
                        contained,
                    });
                }
            }
            n += 1;
        }
        cycle_edges
    }

    /// Undo `remove_heavy_edges` pendant removals in reverse log order:
    /// every recorded pendant is re-attached to the super-node currently
    /// holding its recorded neighbor, by a fresh mincut-weight edge.
    pub fn re_insert_vertices(&self, graph: &mut MutableGraph, to_insert: Vec<PendantEdge>) {
        for entry in to_insert.into_iter().rev() {
            let curr = graph
                .current_position(entry.neighbor)
                .expect("pendant neighbor no longer in graph");
            let vtx = graph.new_empty_node();
            graph.new_edge(curr, vtx, self.mincut);
            for &v in &entry.contained {
                graph.set_current_position(v, Some(vtx));
            }
            graph.set_contained_vertices(vtx, entry.contained);
        }
    }

    /// Undo `contract_cycle_edges` in reverse log order. When the two
    /// recorded endpoints have since been merged into one super-node, the
    /// cycle degenerates and the vertex comes back as a single
    /// mincut-weight pendant instead.
    pub fn re_insert_cycles(&self, graph: &mut MutableGraph, to_insert: Vec<CycleVertex>) {
        let half = self.mincut / 2;
        for entry in to_insert.into_iter().rev() {
            let (p0, p1) = entry.endpoints;
            let n0 = graph
                .current_position(p0)
                .expect("cycle endpoint no longer in graph");
            let n1 = graph
                .current_position(p1)
                .expect("cycle endpoint no longer in graph");

            let re_ins = graph.new_empty_node();
            if n0 == n1 {
                graph.new_edge(n0, re_ins, self.mincut);
            } else {
                let e = graph
                    .find_edge(n0, n1)
                    .expect("cycle endpoints lost their connecting edge");
                graph.new_edge(n0, re_ins, half);
                graph.new_edge(n1, re_ins, half);

                let w01 = graph.edge_weight(n0, e);
                if w01 == half {
                    graph.delete_edge(n0, e);
                } else {
                    graph.set_edge_weight(n0, e, w01 - half);
                }
            }
            for &v in &entry.contained {
                graph.set_current_position(v, Some(re_ins));
            }
            graph.set_contained_vertices(re_ins, entry.contained);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::algorithms::heavy_edge_reducer::HeavyEdgeReducer;
    use crate::graph::MutableGraph;

    #[test]
    fn test_uniform_triangle_is_left_untouched() {
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 3);
        graph.new_edge(1, 2, 3);
        graph.new_edge(0, 2, 3);

        let reducer = HeavyEdgeReducer::new(3);
        let pendants = reducer.remove_heavy_edges(&mut graph);

        // every edge has mincut weight but no vertex has degree 1
        assert!(pendants.is_empty());
        assert_eq!(graph.n(), 3);
    }

    #[test]
    fn test_heavy_path_collapses_into_one_super_node() {
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 5);
        graph.new_edge(1, 2, 5);

        let reducer = HeavyEdgeReducer::new(3);
        let pendants = reducer.remove_heavy_edges(&mut graph);

        assert!(pendants.is_empty());
        assert_eq!(graph.n(), 1);
        let pos = graph.current_position(0).unwrap();
        assert_eq!(graph.current_position(1), Some(pos));
        assert_eq!(graph.current_position(2), Some(pos));
        let mut contained = graph.contained_vertices(pos).to_vec();
        contained.sort_unstable();
        assert_eq!(contained, vec![0, 1, 2]);
    }

    #[test]
    fn test_star_pendants_are_logged_and_restored() {
        // center 0 with three mincut-weight leaves
        let mut graph = MutableGraph::start_construction(4);
        graph.new_edge(0, 1, 4);
        graph.new_edge(0, 2, 4);
        graph.new_edge(0, 3, 4);

        let reducer = HeavyEdgeReducer::new(4);
        let pendants = reducer.remove_heavy_edges(&mut graph);

        // the last leaf survives: stripping it would leave a single edge
        assert_eq!(pendants.len(), 2);
        assert_eq!(graph.n(), 2);
        for pendant in &pendants {
            assert_eq!(pendant.neighbor, 0);
            assert_eq!(pendant.contained.len(), 1);
        }

        reducer.re_insert_vertices(&mut graph, pendants);

        assert_eq!(graph.n(), 4);
        for leaf in 1..4 {
            let pos = graph.current_position(leaf).unwrap();
            assert_eq!(graph.degree(pos), 1);
            assert_eq!(graph.weighted_degree(pos), 4);
            assert_eq!(graph.edge_target(pos, 0), graph.current_position(0).unwrap());
        }
    }

    #[test]
    fn test_cycle_vertex_is_contracted_and_restored() {
        // triangle with all edges at half the mincut
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 2);
        graph.new_edge(1, 2, 2);
        graph.new_edge(0, 2, 2);

        let reducer = HeavyEdgeReducer::new(4);
        let cycles = reducer.contract_cycle_edges(&mut graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].endpoints, (1, 2));
        assert_eq!(cycles[0].contained, vec![0]);
        assert_eq!(graph.n(), 2);
        assert_eq!(graph.current_position(0), None);
        // the two edges of the contracted vertex merged into the third one
        let n1 = graph.current_position(1).unwrap();
        let n2 = graph.current_position(2).unwrap();
        let e = graph.find_edge(n1, n2).unwrap();
        assert_eq!(graph.edge_weight(n1, e), 4);

        reducer.re_insert_cycles(&mut graph, cycles);

        assert_eq!(graph.n(), 3);
        let restored = graph.current_position(0).unwrap();
        assert_eq!(graph.degree(restored), 2);
        assert_eq!(graph.weighted_degree(restored), 4);
        let n1 = graph.current_position(1).unwrap();
        let n2 = graph.current_position(2).unwrap();
        let e = graph.find_edge(n1, n2).unwrap();
        assert_eq!(graph.edge_weight(n1, e), 2);
    }

    #[test]
    fn test_cycle_reinsertion_with_merged_endpoints_becomes_pendant() {
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 2);
        graph.new_edge(1, 2, 2);
        graph.new_edge(0, 2, 2);

        let reducer = HeavyEdgeReducer::new(4);
        let cycles = reducer.contract_cycle_edges(&mut graph);
        assert_eq!(cycles.len(), 1);

        // merge the two remaining super-nodes before replaying the log
        let n1 = graph.current_position(1).unwrap();
        let e = graph
            .find_edge(n1, graph.current_position(2).unwrap())
            .unwrap();
        graph.contract_edge(n1, e);
        assert_eq!(graph.n(), 1);

        reducer.re_insert_cycles(&mut graph, cycles);

        assert_eq!(graph.n(), 2);
        let restored = graph.current_position(0).unwrap();
        assert_eq!(graph.degree(restored), 1);
        assert_eq!(graph.edge_weight(restored, 0), 4);
    }

    #[test]
    fn test_pendant_of_merged_super_node_names_first_contained_neighbor() {
        // 0, 1, 3 and 4 merge through heavy edges, 2 hangs off the merged
        // super-node with mincut weight, 5 keeps the graph above two nodes
        let mut graph = MutableGraph::start_construction(6);
        graph.new_edge(0, 1, 9);
        graph.new_edge(0, 2, 3);
        graph.new_edge(1, 3, 5);
        graph.new_edge(3, 4, 5);
        graph.new_edge(0, 5, 2);

        let reducer = HeavyEdgeReducer::new(3);
        let pendants = reducer.remove_heavy_edges(&mut graph);

        assert_eq!(pendants.len(), 1);
        assert_eq!(pendants[0].neighbor, 0);
        assert_eq!(pendants[0].contained, vec![2]);
        assert_eq!(graph.current_position(2), None);
        assert_eq!(graph.n(), 2);
    }
}
