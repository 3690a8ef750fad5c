use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::algorithms::max_flow_min_cut::solve_max_flow_min_cut;
use crate::graph::MutableGraph;
use crate::multicut::{delete_term_edges, set_terminals, MulticutConfig, MulticutProblem};

/// Iterative improver for a k-way multicut solution. Alternates max-flow
/// based re-partitioning of terminal block pairs with gain-driven boundary
/// vertex moves until neither finds an improvement, then optionally
/// contracts the moved vertices into their new blocks.
///
/// `solution[v]` holds the block index of vertex `v` of the original graph;
/// vertices with `fixed_vertex[v]` set (terminals and pinned vertices) never
/// change block.
pub struct MulticutLocalSearch<'a> {
    problem: &'a mut MulticutProblem,
    original_graph: &'a MutableGraph,
    original_terminals: &'a [usize],
    fixed_vertex: &'a [bool],
    config: &'a MulticutConfig,
    solution: &'a mut [usize],
    // original vertex id -> block it was moved to by a gain move
    moved_to_new_block: FxHashMap<usize, usize>,
    // inter-block weights seen at the last flow pass, used to skip pairs
    // whose boundary did not change
    previous_connectivity: Vec<Vec<i64>>,
    rng: SmallRng,
}

impl<'a> MulticutLocalSearch<'a> {
    pub fn new(
        problem: &'a mut MulticutProblem,
        original_graph: &'a MutableGraph,
        original_terminals: &'a [usize],
        fixed_vertex: &'a [bool],
        config: &'a MulticutConfig,
        solution: &'a mut [usize],
    ) -> Self {
        let num_blocks = original_terminals.len();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            problem,
            original_graph,
            original_terminals,
            fixed_vertex,
            config,
            solution,
            moved_to_new_block: FxHashMap::default(),
            previous_connectivity: vec![vec![0; num_blocks]; num_blocks],
            rng,
        }
    }

    /// Run flow and gain local search rounds until a fixpoint is reached.
    /// Returns the total improvement; the cut weight of the solution never
    /// increases.
    pub fn improve_solution(&mut self) -> i64 {
        let mut total_improvement = 0;
        let mut ls_iter = 0;
        loop {
            let flow_improvement = self.flow_local_search();
            let gain_improvement = self.gain_local_search();
            total_improvement += flow_improvement + gain_improvement;
            log::debug!(
                "local search iteration {} complete - flow:{} gain:{}",
                ls_iter,
                flow_improvement,
                gain_improvement
            );
            ls_iter += 1;
            if flow_improvement == 0 && gain_improvement == 0 {
                break;
            }
        }
        total_improvement
    }

    // Recompute the pairwise inter-block weights, then re-partition every
    // block pair whose boundary changed since the previous pass, in random
    // order.
    fn flow_local_search(&mut self) -> i64 {
        let num_blocks = self.original_terminals.len();
        let mut block_connectivity = vec![vec![0i64; num_blocks]; num_blocks];

        for n in self.original_graph.nodes() {
            let block_n = self.solution[n];
            for e in self.original_graph.edges_of(n) {
                let (t, w) = self.original_graph.edge(n, e);
                if self.solution[t] > block_n && (!self.fixed_vertex[n] || !self.fixed_vertex[t]) {
                    block_connectivity[block_n][self.solution[t]] += w;
                }
            }
        }

        let mut neighboring_blocks = Vec::new();
        for i in 0..num_blocks {
            for j in 0..num_blocks {
                let connect = block_connectivity[i][j];
                if connect != self.previous_connectivity[i][j] {
                    neighboring_blocks.push((i, j, connect));
                }
            }
        }

        neighboring_blocks.shuffle(&mut self.rng);

        let mut improvement = 0;
        for (a, b, _) in neighboring_blocks {
            let (pair_improvement, connect) = self.flow_between_blocks(a, b);
            improvement += pair_improvement;
            self.previous_connectivity[a][b] = connect;
        }
        improvement
    }

    // Build the auxiliary graph induced by the two blocks, solve a max flow
    // between their fixed sides and re-assign every free vertex of the pair
    // to the side of the cut it landed on.
    fn flow_between_blocks(&mut self, terminal1: usize, terminal2: usize) -> (i64, i64) {
        let n = self.original_graph.n();
        let mut mapping: Vec<Option<usize>> = vec![None; n];
        let mut sol_weight = 0i64;

        // nodes 0 and 1 stand for the fixed vertices of each block
        let mut id = 2;
        for v in self.original_graph.nodes() {
            if self.solution[v] != terminal1 && self.solution[v] != terminal2 {
                continue;
            }
            if self.fixed_vertex[v] {
                mapping[v] = Some(if self.solution[v] == terminal1 { 0 } else { 1 });
            } else {
                mapping[v] = Some(id);
                id += 1;
            }
        }

        let mut flow_graph = MutableGraph::start_construction(id);
        let mut edges_to_fixed0: FxHashMap<usize, i64> = FxHashMap::default();
        let mut edges_to_fixed1: FxHashMap<usize, i64> = FxHashMap::default();
        for v in self.original_graph.nodes() {
            let Some(m_v) = mapping[v] else {
                continue;
            };
            for e in self.original_graph.edges_of(v) {
                let (t, w) = self.original_graph.edge(v, e);
                // count each qualifying edge from one side only
                let Some(m_t) = mapping[t] else {
                    continue;
                };
                if m_v >= m_t || m_t < 2 {
                    continue;
                }

                if self.solution[t] != self.solution[v] {
                    sol_weight += w;
                }

                if m_v == 0 {
                    *edges_to_fixed0.entry(m_t).or_insert(0) += w;
                } else if m_v == 1 {
                    *edges_to_fixed1.entry(m_t).or_insert(0) += w;
                } else {
                    flow_graph.new_edge(m_v, m_t, w);
                }
            }
        }
        for (&t, &w) in &edges_to_fixed0 {
            flow_graph.new_edge(t, 0, w);
        }
        for (&t, &w) in &edges_to_fixed1 {
            flow_graph.new_edge(t, 1, w);
        }

        let terminals = [0, 1];
        let (flow, source_side) = solve_max_flow_min_cut(&flow_graph, &terminals, 0, true);
        let source_set: FxHashSet<usize> = source_side.into_iter().collect();

        if flow < sol_weight {
            log::debug!("{}-{}: {} to {}", terminal1, terminal2, sol_weight, flow);
        }

        let improvement = sol_weight - flow;
        for v in self.original_graph.nodes() {
            if self.solution[v] == terminal1 || self.solution[v] == terminal2 {
                let on_source_side = source_set.contains(&mapping[v].unwrap());
                if self.fixed_vertex[v] {
                    assert_eq!(
                        on_source_side,
                        self.solution[v] == terminal1,
                        "fixed vertex {} switched sides in flow re-partition",
                        v
                    );
                }
                self.solution[v] = if on_source_side { terminal1 } else { terminal2 };
            }
        }
        (improvement, flow)
    }

    // Visit the vertices in a random order and greedily move boundary
    // vertices, alone or paired with a same-block neighbor, to the adjacent
    // block they are most connected to.
    fn gain_local_search(&mut self) -> i64 {
        let n = self.original_graph.n();
        let num_blocks = self.config.num_terminals;
        let mut improvement = 0i64;

        let mut permute: Vec<usize> = (0..n).collect();
        let mut in_boundary = vec![true; n];
        // deferred move candidates: (block, gain) of the best single move
        // that was not worth taking alone
        let mut next_best: Vec<Option<(usize, i64)>> = vec![None; n];

        let mut is_term = vec![false; self.problem.graph.n()];
        for t in &self.problem.terminals {
            is_term[t.position] = true;
        }

        permute.shuffle(&mut self.rng);

        for idx in 0..n {
            let v = permute[idx];
            if self.fixed_vertex[v] || !in_boundary[v] {
                continue;
            }
            let mapped = self.problem.mapped(v);
            let Some(position) = self.problem.graph.current_position(mapped) else {
                continue;
            };
            if is_term[position] {
                continue;
            }

            let mut blockwgt = vec![0i64; num_blocks];
            let own_block = self.solution[v];
            for e in self.original_graph.edges_of(v) {
                let (t, w) = self.original_graph.edge(v, e);
                blockwgt[self.solution[t]] += w;
            }

            let own_block_wgt = blockwgt[own_block];
            let mut max_block = 0;
            let mut max_block_wgt = 0;
            for (block, &wgt) in blockwgt.iter().enumerate() {
                if block != own_block && wgt > max_block_wgt {
                    max_block = block;
                    max_block_wgt = wgt;
                }
            }

            if max_block_wgt > 0 {
                // off the boundary until a neighbor moves again
                in_boundary[v] = false;
            }

            let gain = max_block_wgt - own_block_wgt;

            // A neighbor deferred with the same destination can make a
            // paired move worthwhile: the shared edge stays interior, so
            // its weight is credited twice relative to the separate gains.
            let mut paired = false;
            for e in self.original_graph.edges_of(v) {
                let (t, w) = self.original_graph.edge(v, e);
                let Some((nbr_block, nbr_gain)) = next_best[t] else {
                    continue;
                };
                let movegain = nbr_gain + gain + 2 * w;
                if self.solution[t] == self.solution[v]
                    && nbr_block == max_block
                    && movegain > 0
                    && movegain > gain
                {
                    self.solution[v] = max_block;
                    self.solution[t] = max_block;
                    improvement += movegain;
                    if self.config.inexact {
                        self.moved_to_new_block.insert(v, max_block);
                        self.moved_to_new_block.insert(t, max_block);
                    }

                    for e2 in self.original_graph.edges_of(v) {
                        let b = self.original_graph.edge_target(v, e2);
                        next_best[b] = None;
                        in_boundary[b] = true;
                    }
                    next_best[t] = None;
                    for e2 in self.original_graph.edges_of(t) {
                        let b = self.original_graph.edge_target(t, e2);
                        next_best[b] = None;
                        in_boundary[b] = true;
                    }
                    paired = true;
                    break;
                }
            }
            if paired {
                continue;
            }

            if gain >= 0 {
                self.solution[v] = max_block;
                if self.config.inexact {
                    self.moved_to_new_block.insert(v, max_block);
                }
                improvement += gain;
                for e in self.original_graph.edges_of(v) {
                    let t = self.original_graph.edge_target(v, e);
                    next_best[t] = None;
                    in_boundary[t] = true;
                }
            } else {
                next_best[v] = Some((max_block, gain));
            }
        }
        improvement
    }

    /// Contract, block by block in ascending id, every vertex that a gain
    /// move assigned to a new block into that block's terminal super-node,
    /// refreshing terminal positions after each contraction and finally
    /// dropping edges running between terminals.
    pub fn contract_moved_vertices(&mut self) {
        let num_blocks = self.original_terminals.len();
        for block in 0..num_blocks {
            let term_positions: FxHashSet<usize> = self
                .problem
                .terminals
                .iter()
                .map(|t| t.position)
                .collect();
            let mut ctr_set = FxHashSet::default();
            if let Some(terminal) = self
                .problem
                .terminals
                .iter()
                .find(|t| t.original_id == block)
            {
                ctr_set.insert(terminal.position);
            }
            for (&v, &new_block) in &self.moved_to_new_block {
                if new_block != block {
                    continue;
                }
                let mapped = self.problem.mapped(v);
                if let Some(current) = self.problem.graph.current_position(mapped) {
                    if !term_positions.contains(&current) {
                        ctr_set.insert(current);
                    }
                }
            }
            if ctr_set.len() > 1 {
                self.problem.graph.contract_vertex_set(&ctr_set);
            }
            set_terminals(self.problem, self.original_terminals);
        }
        delete_term_edges(self.problem, self.original_terminals);
    }
}
