//! Local coverage planner.
//!
//! Once per planning tick, [`LocalCoveragePlanner::solve_local_coverage`]
//! turns the current viewpoint catalog into a local exploration path:
//!
//! 1. Resolve the four navigation anchors (robot, lookahead, global-path
//!    entry and exit).
//! 2. Re-validate the viewpoints kept from the previous cycle and
//!    pre-mark their coverage together with the anchors.
//! 3. Rank the remaining candidates into surface and frontier queues.
//! 4. Run a few rounds of randomized greedy selection plus TSP
//!    sequencing and keep the shortest tour.
//!
//! The winning viewpoint order is remembered across cycles and reflected
//! back into the manager's `selected` flags.

mod selection;
mod tour;

use std::time::Instant;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::CoverageConfig;
use crate::core::{ExplorationPath, NodeType, PathNode, Point3};
use crate::coverage::CoverageBitmap;
use crate::tsp::{GreedyTwoOptSolver, TspSolver};
use crate::viewpoint::{ArrayInd, ViewpointId, ViewpointManager};

/// Role of a remembered viewpoint, for downstream visualization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectedViewpointClass {
    /// Nearest to the robot
    Robot,
    /// Global-path entry handoff
    PathStart,
    /// Global-path exit handoff
    PathEnd,
    /// Ordinary coverage viewpoint
    Ordinary,
}

/// Local coverage planner.
///
/// Owns the planning configuration, the TSP solver, and the only
/// cross-cycle state of the subsystem: the viewpoint order of the
/// previous winning tour. The viewpoint manager is borrowed per call.
pub struct LocalCoveragePlanner<S: TspSolver = GreedyTwoOptSolver> {
    config: CoverageConfig,
    solver: S,

    robot_position: Point3,
    lookahead_point: Point3,
    lookahead_point_update: bool,
    use_frontier: bool,
    local_coverage_complete: bool,

    // Anchors resolved for the current cycle
    robot_viewpoint: Option<ViewpointId>,
    lookahead_viewpoint: Option<ViewpointId>,
    start_viewpoint: Option<ViewpointId>,
    end_viewpoint: Option<ViewpointId>,

    // Cycle memory: ordered ids of the previous winning tour, plus the
    // dense-index mirror
    last_selected_ids: Vec<ViewpointId>,
    last_selected_array_inds: Vec<ArrayInd>,

    // Runtime accumulators (microseconds), reset every solve
    find_path_runtime: u64,
    viewpoint_sampling_runtime: u64,
    tsp_runtime: u64,
}

impl LocalCoveragePlanner<GreedyTwoOptSolver> {
    /// Create a planner with the built-in TSP solver.
    pub fn new(config: CoverageConfig) -> Self {
        Self::with_solver(config, GreedyTwoOptSolver::new())
    }
}

impl<S: TspSolver> LocalCoveragePlanner<S> {
    /// Create a planner with an injected TSP solver.
    pub fn with_solver(config: CoverageConfig, solver: S) -> Self {
        Self {
            config,
            solver,
            robot_position: Point3::ZERO,
            lookahead_point: Point3::ZERO,
            lookahead_point_update: false,
            use_frontier: true,
            local_coverage_complete: false,
            robot_viewpoint: None,
            lookahead_viewpoint: None,
            start_viewpoint: None,
            end_viewpoint: None,
            last_selected_ids: Vec::new(),
            last_selected_array_inds: Vec::new(),
            find_path_runtime: 0,
            viewpoint_sampling_runtime: 0,
            tsp_runtime: 0,
        }
    }

    /// Update the robot position for the next cycle.
    pub fn set_robot_position(&mut self, position: Point3) {
        self.robot_position = position;
    }

    /// Update the lookahead target for the next cycle.
    pub fn set_lookahead_point(&mut self, point: Point3) {
        self.lookahead_point = point;
        self.lookahead_point_update = true;
    }

    /// Enable or disable frontier coverage.
    pub fn set_use_frontier(&mut self, use_frontier: bool) {
        self.use_frontier = use_frontier;
    }

    /// Whether the last cycle found nothing left to cover locally.
    pub fn local_coverage_complete(&self) -> bool {
        self.local_coverage_complete
    }

    /// Planner configuration.
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Viewpoint ids of the previous winning tour, in tour order.
    pub fn last_selected_viewpoint_ids(&self) -> &[ViewpointId] {
        &self.last_selected_ids
    }

    /// Time spent querying inter-viewpoint paths in the last cycle (µs).
    pub fn find_path_runtime_us(&self) -> u64 {
        self.find_path_runtime
    }

    /// Time spent sampling and ranking viewpoints in the last cycle (µs).
    pub fn viewpoint_sampling_runtime_us(&self) -> u64 {
        self.viewpoint_sampling_runtime
    }

    /// Time spent in the TSP solver in the last cycle (µs).
    pub fn tsp_runtime_us(&self) -> u64 {
        self.tsp_runtime
    }

    /// Remembered viewpoints with their anchor classification, for
    /// visualization.
    pub fn selected_viewpoint_markers<M: ViewpointManager>(
        &self,
        manager: &M,
    ) -> Vec<(Point3, SelectedViewpointClass)> {
        self.last_selected_ids
            .iter()
            .map(|&id| {
                let class = if Some(id) == self.robot_viewpoint {
                    SelectedViewpointClass::Robot
                } else if Some(id) == self.start_viewpoint {
                    SelectedViewpointClass::PathStart
                } else if Some(id) == self.end_viewpoint {
                    SelectedViewpointClass::PathEnd
                } else {
                    SelectedViewpointClass::Ordinary
                };
                (manager.position(id), class)
            })
            .collect()
    }

    /// Plan the local coverage path for this tick.
    ///
    /// `uncovered_point_num` and `uncovered_frontier_point_num` size the
    /// coverage bitmaps; every point index the manager reports must lie
    /// below the respective bound.
    pub fn solve_local_coverage<M: ViewpointManager>(
        &mut self,
        manager: &mut M,
        global_path: &ExplorationPath,
        uncovered_point_num: usize,
        uncovered_frontier_point_num: usize,
    ) -> ExplorationPath {
        self.find_path_runtime = 0;
        self.viewpoint_sampling_runtime = 0;
        self.tsp_runtime = 0;
        self.local_coverage_complete = false;

        let find_path_timer = Instant::now();
        let Some(navigation_viewpoints) = self.resolve_anchors(manager, global_path) else {
            debug!("[Coverage] no candidate viewpoints, local coverage complete");
            self.local_coverage_complete = true;
            return ExplorationPath::new();
        };
        self.find_path_runtime += elapsed_us(find_path_timer);

        let sampling_timer = Instant::now();
        let mut covered = CoverageBitmap::new(uncovered_point_num);
        let mut frontier_covered = CoverageBitmap::new(uncovered_frontier_point_num);

        // Re-validate viewpoints carried over from the previous cycle
        let reused_viewpoints = self.reusable_viewpoints(manager, &covered, &frontier_covered);

        let pre_selected_array_inds: Vec<ArrayInd> = reused_viewpoints
            .iter()
            .chain(navigation_viewpoints.iter())
            .map(|&id| manager.array_ind(id))
            .collect();

        for &array_ind in &pre_selected_array_inds {
            covered.mark_all(manager.covered_surface_points(array_ind.into()));
            if self.use_frontier {
                frontier_covered.mark_all(manager.covered_frontier_points(array_ind.into()));
            }
        }

        let (queue, mut frontier_queue) =
            self.enqueue_candidates(manager, &covered, &frontier_covered, &pre_selected_array_inds);
        self.viewpoint_sampling_runtime += elapsed_us(sampling_timer);

        let mut local_path = ExplorationPath::new();
        if !queue.is_empty() && queue[0].0 > self.config.min_add_point_num {
            let mut min_path_length = f32::INFINITY;
            for _ in 0..self.config.path_optimization_iterations {
                let select_timer = Instant::now();
                let mut selected = self.select_viewpoints(manager, &queue, &covered, false);

                // Frontier selection works on per-iteration copies so one
                // round's picks do not bleed into the next
                let mut frontier_queue_itr = frontier_queue.clone();
                let mut frontier_covered_itr = frontier_covered.clone();
                self.select_from_frontier_queue(
                    manager,
                    &mut frontier_queue_itr,
                    &mut frontier_covered_itr,
                    &mut selected,
                );

                selected.extend_from_slice(&reused_viewpoints);
                selected.extend_from_slice(&navigation_viewpoints);
                dedup_preserving_order(&mut selected);
                self.viewpoint_sampling_runtime += elapsed_us(select_timer);

                let Some((path_itr, ordered)) = self.solve_tsp(manager, &selected) else {
                    continue;
                };
                let path_length = path_itr.length();
                if !path_itr.is_empty() && path_length < min_path_length {
                    min_path_length = path_length;
                    local_path = path_itr;
                    self.last_selected_ids = ordered;
                }
            }
        } else {
            debug!(
                "[Coverage] surface queue exhausted (top gain {:?}), frontier-only pass",
                queue.first().map(|e| e.0)
            );
            let select_timer = Instant::now();
            let mut selected = reused_viewpoints.clone();
            self.select_from_frontier_queue(
                manager,
                &mut frontier_queue,
                &mut frontier_covered,
                &mut selected,
            );
            if selected.is_empty() {
                self.local_coverage_complete = true;
            }
            selected.extend_from_slice(&navigation_viewpoints);
            dedup_preserving_order(&mut selected);
            self.viewpoint_sampling_runtime += elapsed_us(select_timer);

            match self.solve_tsp(manager, &selected) {
                Some((path, ordered)) => {
                    local_path = path;
                    self.last_selected_ids = ordered;
                }
                None => debug!("[Coverage] tsp produced no tour, keeping previous selection"),
            }
        }

        self.last_selected_array_inds = self
            .last_selected_ids
            .iter()
            .map(|&id| manager.array_ind(id))
            .collect();

        for i in 0..manager.viewpoint_count() {
            manager.set_selected(ArrayInd(i).into(), false);
        }
        for &id in &self.last_selected_ids {
            if Some(id) != self.robot_viewpoint
                && Some(id) != self.start_viewpoint
                && Some(id) != self.end_viewpoint
                && Some(id) != self.lookahead_viewpoint
            {
                manager.set_selected(id.into(), true);
            }
        }

        local_path
    }

    /// Resolve the four anchors and return them in the order
    /// `[start, end, robot, lookahead]`. `None` when there are no
    /// candidates at all.
    fn resolve_anchors<M: ViewpointManager>(
        &mut self,
        manager: &M,
        global_path: &ExplorationPath,
    ) -> Option<Vec<ViewpointId>> {
        let robot = manager.nearest_candidate(self.robot_position)?;
        let lookahead = if self.lookahead_point_update {
            manager
                .nearest_candidate(self.lookahead_point)
                .filter(|&id| manager.in_range(id))
                .unwrap_or(robot)
        } else {
            robot
        };
        let start = boundary_viewpoint(manager, robot, global_path.nodes().iter());
        let end = boundary_viewpoint(manager, robot, global_path.nodes().iter().rev());

        self.robot_viewpoint = Some(robot);
        self.lookahead_viewpoint = Some(lookahead);
        self.start_viewpoint = Some(start);
        self.end_viewpoint = Some(end);
        Some(vec![start, end, robot, lookahead])
    }

    /// Previous-cycle viewpoints that are still worth visiting.
    fn reusable_viewpoints<M: ViewpointManager>(
        &self,
        manager: &M,
        covered: &CoverageBitmap,
        frontier_covered: &CoverageBitmap,
    ) -> Vec<ViewpointId> {
        let mut reused = Vec::new();
        for &array_ind in &self.last_selected_array_inds {
            if manager.visited(array_ind.into()) || !manager.is_candidate(array_ind.into()) {
                continue;
            }
            if manager.surface_gain(covered, array_ind.into()) >= self.config.min_add_point_num {
                reused.push(manager.viewpoint_id(array_ind));
            } else if self.use_frontier
                && manager.frontier_gain(frontier_covered, array_ind.into())
                    >= self.config.min_add_frontier_point_num
            {
                reused.push(manager.viewpoint_id(array_ind));
            }
        }
        if !reused.is_empty() {
            debug!("[Coverage] reusing {} viewpoints from last cycle", reused.len());
        }
        reused
    }

    /// PRNG for one greedy selection pass: seeded from configuration when
    /// set, from the OS otherwise.
    fn sample_rng(&self) -> StdRng {
        match self.config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Walk the global path while it stays local and return the candidate
/// nearest to the last local node, falling back to the robot viewpoint.
fn boundary_viewpoint<'a, M, I>(manager: &M, robot: ViewpointId, nodes: I) -> ViewpointId
where
    M: ViewpointManager,
    I: IntoIterator<Item = &'a PathNode>,
{
    let mut boundary = robot;
    let mut entered = false;
    for node in nodes {
        if !entered {
            // A path that starts outside the horizon contributes nothing
            if !manager.in_local_planning_horizon(node.position) {
                return boundary;
            }
            entered = true;
        }
        if matches!(node.node_type, NodeType::GlobalViewpoint | NodeType::Home)
            || !manager.in_local_planning_horizon(node.position)
        {
            break;
        }
        if let Some(id) = manager.nearest_candidate(node.position) {
            boundary = id;
        }
    }
    boundary
}

/// Remove duplicate ids, keeping the first occurrence of each.
fn dedup_preserving_order(ids: &mut Vec<ViewpointId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|&id| seen.insert(id));
}

fn elapsed_us(timer: Instant) -> u64 {
    timer.elapsed().as_micros() as u64
}
