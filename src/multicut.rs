use crate::graph::MutableGraph;

/// A terminal of the k-way multicut instance. `original_id` is the
/// terminal's block index in `0..k`; `position` is the super-node currently
/// holding it.
#[derive(Clone, Debug)]
pub struct Terminal {
    pub original_id: usize,
    pub position: usize,
}

/// A live multicut instance: the (possibly contracted) working graph, the
/// terminals with their current positions, and the map from a vertex of the
/// uncontracted input graph to the original id it is tracked under in the
/// working graph's position table.
pub struct MulticutProblem {
    pub graph: MutableGraph,
    pub terminals: Vec<Terminal>,
    pub mapped: Vec<usize>,
}

impl MulticutProblem {
    /// Wrap a fresh working graph whose vertices coincide with the input
    /// graph's, with the given terminal vertices.
    pub fn from_graph(graph: MutableGraph, terminal_vertices: &[usize]) -> Self {
        let mapped = (0..graph.n()).collect();
        let mut problem = Self {
            graph,
            terminals: Vec::new(),
            mapped,
        };
        set_terminals(&mut problem, terminal_vertices);
        problem
    }

    pub fn mapped(&self, vertex: usize) -> usize {
        self.mapped[vertex]
    }
}

/// Settings consumed by the multicut local search.
pub struct MulticutConfig {
    /// The k in k-way multicut; sizes the per-block weight accumulators.
    pub num_terminals: usize,
    /// When true, gain-based moves are recorded so the driver can contract
    /// the moved vertices away afterwards.
    pub inexact: bool,
    /// Seed for the traversal permutations. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for MulticutConfig {
    fn default() -> Self {
        Self {
            num_terminals: 2,
            inexact: false,
            seed: None,
        }
    }
}

/// Refresh the terminal positions from the working graph's position map
/// after a contraction. Terminals whose vertex has been removed from the
/// graph are dropped.
pub fn set_terminals(problem: &mut MulticutProblem, original_terminals: &[usize]) {
    problem.terminals.clear();
    for (block, &terminal) in original_terminals.iter().enumerate() {
        let mapped = problem.mapped[terminal];
        if let Some(position) = problem.graph.current_position(mapped) {
            problem.terminals.push(Terminal {
                original_id: block,
                position,
            });
        }
    }
}

/// Delete every edge running between two distinct terminal super-nodes.
/// Such an edge can never leave the cut, so it carries no information for
/// the remaining search.
pub fn delete_term_edges(problem: &mut MulticutProblem, original_terminals: &[usize]) {
    set_terminals(problem, original_terminals);
    let mut is_term = vec![false; problem.graph.n()];
    for t in &problem.terminals {
        is_term[t.position] = true;
    }

    for t in 0..problem.terminals.len() {
        let position = problem.terminals[t].position;
        let mut e = problem.graph.degree(position);
        while e > 0 {
            e -= 1;
            let target = problem.graph.edge_target(position, e);
            if is_term[target] {
                problem.graph.delete_edge(position, e);
            }
        }
    }
}
