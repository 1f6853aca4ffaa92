//! Built-in heuristic TSP solver.
//!
//! Nearest-neighbour construction from the depot followed by 2-opt local
//! search. The 9999-cost dummy edges dominate every metric edge, so the
//! local search settles the dummy between its two zero-cost partners,
//! which is exactly the adjacency the tour builder encodes.

use log::trace;

use super::{TspSolution, TspSolver};

/// Nearest-neighbour + 2-opt solver.
#[derive(Clone, Debug)]
pub struct GreedyTwoOptSolver {
    /// Maximum number of full 2-opt improvement passes.
    max_passes: usize,
}

impl Default for GreedyTwoOptSolver {
    fn default() -> Self {
        Self { max_passes: 32 }
    }
}

impl GreedyTwoOptSolver {
    /// Create a solver with the default pass limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the 2-opt pass limit.
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Greedy construction: always move to the cheapest remaining node.
    fn nearest_neighbour(matrix: &[Vec<i32>], depot: usize) -> Vec<usize> {
        let n = matrix.len();
        let mut order = Vec::with_capacity(n);
        order.push(depot);
        let mut remaining: Vec<usize> = (0..n).filter(|&node| node != depot).collect();
        let mut current = depot;
        while !remaining.is_empty() {
            let mut best_slot = 0;
            let mut best_cost = i32::MAX;
            for (slot, &node) in remaining.iter().enumerate() {
                if matrix[current][node] < best_cost {
                    best_cost = matrix[current][node];
                    best_slot = slot;
                }
            }
            current = remaining.swap_remove(best_slot);
            order.push(current);
        }
        order
    }

    /// 2-opt local search on the closed cycle; the depot stays at
    /// position 0.
    fn two_opt(&self, matrix: &[Vec<i32>], order: &mut [usize]) {
        let n = order.len();
        if n < 4 {
            return;
        }
        let cost = |a: usize, b: usize| i64::from(matrix[a][b]);
        for pass in 0..self.max_passes {
            let mut improved = false;
            for i in 1..n - 1 {
                for j in i + 1..=n {
                    let a = order[i - 1];
                    let b = order[i];
                    let c = order[j - 1];
                    let d = order[j % n];
                    // Reversing order[i..j] swaps edges (a,b),(c,d) for
                    // (a,c),(b,d).
                    let delta = cost(a, c) + cost(b, d) - cost(a, b) - cost(c, d);
                    if delta < 0 {
                        order[i..j].reverse();
                        improved = true;
                    }
                }
            }
            if !improved {
                trace!("[Tsp] 2-opt converged after {} passes", pass + 1);
                return;
            }
        }
    }
}

impl TspSolver for GreedyTwoOptSolver {
    fn solve(&mut self, distance_matrix: &[Vec<i32>], depot: usize) -> Option<TspSolution> {
        let n = distance_matrix.len();
        if n == 0 || depot >= n {
            return None;
        }
        assert!(
            distance_matrix.iter().all(|row| row.len() == n),
            "distance matrix must be square"
        );
        let mut order = Self::nearest_neighbour(distance_matrix, depot);
        self.two_opt(distance_matrix, &mut order);
        Some(TspSolution::new(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsp::UNREACHABLE_COST;

    /// Symmetric matrix over colinear points at the given 1D offsets,
    /// scaled by 10.
    fn line_matrix(offsets: &[i32]) -> Vec<Vec<i32>> {
        offsets
            .iter()
            .map(|&a| offsets.iter().map(|&b| (a - b).abs() * 10).collect())
            .collect()
    }

    #[test]
    fn test_empty_matrix_yields_none() {
        let mut solver = GreedyTwoOptSolver::new();
        assert!(solver.solve(&[], 0).is_none());
    }

    #[test]
    fn test_depot_out_of_range_yields_none() {
        let mut solver = GreedyTwoOptSolver::new();
        assert!(solver.solve(&line_matrix(&[0, 1]), 2).is_none());
    }

    #[test]
    fn test_single_node() {
        let mut solver = GreedyTwoOptSolver::new();
        let solution = solver.solve(&line_matrix(&[0]), 0).unwrap();
        assert_eq!(solution.node_order(false), vec![0]);
    }

    #[test]
    fn test_line_from_endpoint_walks_in_order() {
        let mut solver = GreedyTwoOptSolver::new();
        let matrix = line_matrix(&[0, 1, 2, 3, 4]);
        let solution = solver.solve(&matrix, 0).unwrap();
        assert_eq!(solution.node_order(false), vec![0, 1, 2, 3, 4]);
        // Out and back along the line: twice the span
        assert_eq!(solution.total_cost(&matrix), 2 * 40);
    }

    #[test]
    fn test_starts_at_depot() {
        let mut solver = GreedyTwoOptSolver::new();
        let solution = solver.solve(&line_matrix(&[0, 5, 2, 8]), 2).unwrap();
        assert_eq!(solution.node_order(false)[0], 2);
    }

    #[test]
    fn test_max_passes_zero_skips_local_search() {
        // Depot between the line ends: greedy construction chases the
        // near neighbour first and pays for it on the long way home
        let matrix = line_matrix(&[10, 9, 12, 0]);

        let mut construction_only = GreedyTwoOptSolver::new().with_max_passes(0);
        let raw = construction_only.solve(&matrix, 0).unwrap();
        assert_eq!(raw.node_order(false), vec![0, 1, 2, 3]);
        assert_eq!(raw.total_cost(&matrix), 260);

        // With local search enabled the crossing is repaired
        let mut solver = GreedyTwoOptSolver::new();
        let improved = solver.solve(&matrix, 0).unwrap();
        assert_eq!(improved.total_cost(&matrix), 240);
    }

    #[test]
    fn test_dummy_forces_endpoint_adjacency() {
        // Line 0..4 plus a dummy (node 5) wired with zero cost to nodes
        // 0 and 4 and prohibitive cost elsewhere.
        let mut matrix = line_matrix(&[0, 1, 2, 3, 4]);
        for row in matrix.iter_mut() {
            row.push(UNREACHABLE_COST);
        }
        let mut dummy_row = vec![UNREACHABLE_COST; 6];
        matrix[0][5] = 0;
        matrix[4][5] = 0;
        dummy_row[0] = 0;
        dummy_row[4] = 0;
        matrix.push(dummy_row);

        let mut solver = GreedyTwoOptSolver::new();
        let solution = solver.solve(&matrix, 0).unwrap();
        // Cutting at the dummy yields the open line walk
        assert_eq!(solution.node_order(true), vec![0, 1, 2, 3, 4]);
        assert_eq!(solution.total_cost(&matrix), 40);
    }
}
