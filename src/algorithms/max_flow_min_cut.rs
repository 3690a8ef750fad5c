use std::collections::VecDeque;

use crate::graph::MutableGraph;

// A directed residual arc. Arcs are stored in twin pairs, so the reverse
// arc of `a` is always `a ^ 1`.
struct Arc {
    target: usize,
    residual: i64,
}

/// Compute a maximum flow and minimum cut between two terminals of a
/// weighted undirected graph, by shortest augmenting paths. Every edge of
/// weight `w` admits `w` units of flow in either direction.
///
/// Returns the flow value together with the vertices on the source side of
/// the induced minimum cut (those reachable from the source in the final
/// residual network), or the sink side when `keep_source_side` is false.
pub fn solve_max_flow_min_cut(
    graph: &MutableGraph,
    terminals: &[usize],
    source_index: usize,
    keep_source_side: bool,
) -> (i64, Vec<usize>) {
    debug_assert_eq!(terminals.len(), 2);
    let source = terminals[source_index];
    let sink = terminals[1 - source_index];
    debug_assert_ne!(source, sink);

    let n = graph.n();
    let mut arcs: Vec<Arc> = Vec::new();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for u in graph.nodes() {
        for e in graph.edges_of(u) {
            let (v, w) = graph.edge(u, e);
            if u < v {
                adjacency[u].push(arcs.len());
                arcs.push(Arc {
                    target: v,
                    residual: w,
                });
                adjacency[v].push(arcs.len());
                arcs.push(Arc {
                    target: u,
                    residual: w,
                });
            }
        }
    }

    let mut flow = 0i64;
    let mut parent_arc = vec![usize::MAX; n];
    let mut seen = vec![false; n];
    loop {
        parent_arc.fill(usize::MAX);
        seen.fill(false);
        seen[source] = true;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }
            for &a in &adjacency[u] {
                let target = arcs[a].target;
                if arcs[a].residual > 0 && !seen[target] {
                    seen[target] = true;
                    parent_arc[target] = a;
                    queue.push_back(target);
                }
            }
        }
        if !seen[sink] {
            break;
        }

        let mut bottleneck = i64::MAX;
        let mut u = sink;
        while u != source {
            let a = parent_arc[u];
            bottleneck = bottleneck.min(arcs[a].residual);
            u = arcs[a ^ 1].target;
        }
        let mut u = sink;
        while u != source {
            let a = parent_arc[u];
            arcs[a].residual -= bottleneck;
            arcs[a ^ 1].residual += bottleneck;
            u = arcs[a ^ 1].target;
        }
        flow += bottleneck;
    }

    // the cut follows residual reachability from the source
    let mut on_source_side = vec![false; n];
    on_source_side[source] = true;
    let mut queue = VecDeque::from([source]);
    while let Some(u) = queue.pop_front() {
        for &a in &adjacency[u] {
            let target = arcs[a].target;
            if arcs[a].residual > 0 && !on_source_side[target] {
                on_source_side[target] = true;
                queue.push_back(target);
            }
        }
    }

    let side = (0..n)
        .filter(|&v| on_source_side[v] == keep_source_side)
        .collect();
    (flow, side)
}

#[cfg(test)]
mod tests {
    use crate::algorithms::max_flow_min_cut::solve_max_flow_min_cut;
    use crate::graph::MutableGraph;

    #[test]
    fn test_path_flow_is_bottleneck() {
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 5);
        graph.new_edge(1, 2, 3);

        let (flow, source_side) = solve_max_flow_min_cut(&graph, &[0, 2], 0, true);

        assert_eq!(flow, 3);
        assert_eq!(source_side, vec![0, 1]);
    }

    #[test]
    fn test_diamond_flow_uses_cross_edge() {
        let mut graph = MutableGraph::start_construction(4);
        graph.new_edge(0, 1, 3);
        graph.new_edge(0, 2, 2);
        graph.new_edge(1, 3, 2);
        graph.new_edge(2, 3, 3);
        graph.new_edge(1, 2, 1);

        let (flow, source_side) = solve_max_flow_min_cut(&graph, &[0, 3], 0, true);

        assert_eq!(flow, 5);
        assert_eq!(source_side, vec![0]);
    }

    #[test]
    fn test_saturated_bridge_keeps_source_alone() {
        let mut graph = MutableGraph::start_construction(3);
        graph.new_edge(0, 1, 2);
        graph.new_edge(1, 2, 2);

        let (flow, source_side) = solve_max_flow_min_cut(&graph, &[0, 2], 0, true);
        assert_eq!(flow, 2);
        assert_eq!(source_side, vec![0]);

        let (_, sink_side) = solve_max_flow_min_cut(&graph, &[0, 2], 0, false);
        assert_eq!(sink_side, vec![1, 2]);
    }

    #[test]
    fn test_disconnected_terminals_have_zero_flow() {
        let mut graph = MutableGraph::start_construction(4);
        graph.new_edge(0, 1, 4);
        graph.new_edge(2, 3, 4);

        let (flow, source_side) = solve_max_flow_min_cut(&graph, &[0, 2], 0, true);

        assert_eq!(flow, 0);
        assert_eq!(source_side, vec![0, 1]);
    }
}
