//! Tour construction over the selected viewpoints.
//!
//! Builds the symmetric integer distance matrix, wires in up to two
//! dummy anchor nodes, invokes the TSP solver, and walks the resulting
//! order into a typed [`ExplorationPath`] with via-points.
//!
//! A dummy node has zero-cost edges to exactly two real nodes and
//! prohibitive cost everywhere else, which forces those two nodes to be
//! adjacent in any decent tour. One dummy brackets the global-path
//! handoffs (and marks where the cycle is cut open), the other brackets
//! the robot and lookahead viewpoints.

use std::time::Instant;

use log::debug;

use crate::core::{ExplorationPath, NodeType, PathNode, Point3};
use crate::tsp::{DISTANCE_SCALE, TspSolver, UNREACHABLE_COST};
use crate::viewpoint::{ViewpointId, ViewpointManager};

use super::{LocalCoveragePlanner, elapsed_us};

/// Euclidean length of a pose sequence.
fn pose_path_length(poses: &[Point3]) -> f32 {
    poses.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

impl<S: TspSolver> LocalCoveragePlanner<S> {
    /// Sequence `selected` into a local path.
    ///
    /// Returns the assembled path together with the viewpoint order that
    /// produced it, or `None` when the selection is empty or the solver
    /// yields no tour.
    pub(crate) fn solve_tsp<M: ViewpointManager>(
        &mut self,
        manager: &M,
        selected: &[ViewpointId],
    ) -> Option<(ExplorationPath, Vec<ViewpointId>)> {
        if selected.is_empty() {
            return None;
        }

        // Locate the anchors inside the selection
        let mut start_ind = selected.len() - 1;
        let mut end_ind = selected.len() - 1;
        let mut robot_ind = 0;
        let mut lookahead_ind = 0;
        for (i, &id) in selected.iter().enumerate() {
            if Some(id) == self.start_viewpoint {
                start_ind = i;
            }
            if Some(id) == self.end_viewpoint {
                end_ind = i;
            }
            if Some(id) == self.robot_viewpoint {
                robot_ind = i;
            }
            if Some(id) == self.lookahead_viewpoint {
                lookahead_ind = i;
            }
        }

        let has_start_end_dummy = start_ind != end_ind;
        let has_robot_lookahead_dummy = robot_ind != lookahead_ind;
        let node_size = selected.len()
            + usize::from(has_start_end_dummy)
            + usize::from(has_robot_lookahead_dummy);

        let find_path_timer = Instant::now();
        let mut distance_matrix = vec![vec![0i32; node_size]; node_size];
        for i in 0..selected.len() {
            for j in 0..i {
                let path = manager.shortest_path(selected[i], selected[j]);
                distance_matrix[i][j] = if path.is_empty() {
                    UNREACHABLE_COST
                } else {
                    (DISTANCE_SCALE * pose_path_length(&path)) as i32
                };
            }
        }
        for i in 0..selected.len() {
            for j in i + 1..selected.len() {
                distance_matrix[i][j] = distance_matrix[j][i];
            }
        }

        // Wire the dummy nodes. The start/end dummy always occupies the
        // last row so the solver's open cut lands on it.
        if has_start_end_dummy && has_robot_lookahead_dummy {
            let start_end_dummy = node_size - 1;
            let robot_lookahead_dummy = node_size - 2;
            for i in 0..selected.len() {
                let start_end_cost = if i == start_ind || i == end_ind {
                    0
                } else {
                    UNREACHABLE_COST
                };
                distance_matrix[i][start_end_dummy] = start_end_cost;
                distance_matrix[start_end_dummy][i] = start_end_cost;

                let robot_lookahead_cost = if i == robot_ind || i == lookahead_ind {
                    0
                } else {
                    UNREACHABLE_COST
                };
                distance_matrix[i][robot_lookahead_dummy] = robot_lookahead_cost;
                distance_matrix[robot_lookahead_dummy][i] = robot_lookahead_cost;
            }
            distance_matrix[start_end_dummy][robot_lookahead_dummy] = UNREACHABLE_COST;
            distance_matrix[robot_lookahead_dummy][start_end_dummy] = UNREACHABLE_COST;
        } else if has_start_end_dummy || has_robot_lookahead_dummy {
            let dummy = node_size - 1;
            let (a, b) = if has_start_end_dummy {
                (start_ind, end_ind)
            } else {
                (robot_ind, lookahead_ind)
            };
            for i in 0..selected.len() {
                let cost = if i == a || i == b { 0 } else { UNREACHABLE_COST };
                distance_matrix[i][dummy] = cost;
                distance_matrix[dummy][i] = cost;
            }
        }
        self.find_path_runtime += elapsed_us(find_path_timer);

        let tsp_timer = Instant::now();
        let solution = self.solver.solve(&distance_matrix, start_ind);
        self.tsp_runtime += elapsed_us(tsp_timer);
        let Some(solution) = solution else {
            debug!("[Tsp] solver returned no tour for {} nodes", node_size);
            return None;
        };

        let mut path_index = solution.node_order(has_start_end_dummy);
        // Drop any remaining dummy indices
        path_index.retain(|&index| index < selected.len());

        let ordered: Vec<ViewpointId> = path_index.iter().map(|&index| selected[index]).collect();

        // A shared entry and exit handoff closes the cycle
        if start_ind == end_ind && !path_index.is_empty() {
            path_index.push(path_index[0]);
        }

        let mut tsp_path = ExplorationPath::new();
        if path_index.len() > 1 {
            for pair in path_index.windows(2) {
                let cur_id = selected[pair[0]];
                let next_id = selected[pair[1]];

                tsp_path.push(self.typed_node(manager, cur_id, true));

                let between = manager.shortest_path(cur_id, next_id);
                if between.len() > 2 {
                    for &pose in &between[1..between.len() - 1] {
                        tsp_path.push(PathNode::via_point(pose));
                    }
                }

                tsp_path.push(self.typed_node(manager, next_id, false));
            }
        }

        Some((tsp_path, ordered))
    }

    /// Node for `id` with its anchor type resolved.
    ///
    /// Only the leading side of each tour pair re-examines the lookahead
    /// viewpoint's gains; on the trailing side it stays a plain lookahead
    /// node.
    fn typed_node<M: ViewpointManager>(
        &self,
        manager: &M,
        id: ViewpointId,
        leading: bool,
    ) -> PathNode {
        let mut node = PathNode::viewpoint(manager.position(id), NodeType::LocalViewpoint, id);
        if Some(id) == self.robot_viewpoint {
            node.node_type = NodeType::Robot;
        } else if Some(id) == self.lookahead_viewpoint {
            node.node_type = if leading
                && (manager.surface_point_count(id.into()) > self.config.min_add_point_num
                    || manager.frontier_point_count(id.into())
                        > self.config.min_add_frontier_point_num)
            {
                NodeType::LocalViewpoint
            } else {
                NodeType::LookaheadPoint
            };
        } else if Some(id) == self.start_viewpoint {
            node.node_type = NodeType::LocalPathStart;
        } else if Some(id) == self.end_viewpoint {
            node.node_type = NodeType::LocalPathEnd;
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoverageConfig;
    use crate::harness::GridViewpointManager;

    /// Manager with viewpoints on the X axis at the given offsets.
    fn line_manager(xs: &[f32]) -> GridViewpointManager {
        let mut manager = GridViewpointManager::new(100.0);
        for (i, &x) in xs.iter().enumerate() {
            manager.add_viewpoint(Point3::new(x, 0.0, 0.0), vec![i], Vec::new());
        }
        manager
    }

    fn planner_with_anchors(
        robot: ViewpointId,
        lookahead: ViewpointId,
        start: ViewpointId,
        end: ViewpointId,
    ) -> LocalCoveragePlanner {
        let mut planner = LocalCoveragePlanner::new(CoverageConfig::default());
        planner.robot_viewpoint = Some(robot);
        planner.lookahead_viewpoint = Some(lookahead);
        planner.start_viewpoint = Some(start);
        planner.end_viewpoint = Some(end);
        planner
    }

    #[test]
    fn test_empty_selection_yields_none() {
        let manager = line_manager(&[0.0]);
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(0));
        assert!(planner.solve_tsp(&manager, &[]).is_none());
    }

    #[test]
    fn test_single_viewpoint_collapses_to_one_node() {
        let manager = line_manager(&[0.0]);
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(0));
        let (path, ordered) = planner.solve_tsp(&manager, &[ViewpointId(0)]).unwrap();
        assert_eq!(ordered, vec![ViewpointId(0)]);
        assert_eq!(path.len(), 1);
        assert_eq!(path.nodes()[0].node_type, NodeType::Robot);
    }

    #[test]
    fn test_closed_tour_returns_to_start() {
        let manager = line_manager(&[0.0, 1.0, 2.0]);
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(0));
        let selected = vec![ViewpointId(0), ViewpointId(1), ViewpointId(2)];
        let (path, ordered) = planner.solve_tsp(&manager, &selected).unwrap();

        assert_eq!(ordered.len(), 3);
        let first = path.nodes().first().unwrap();
        let last = path.nodes().last().unwrap();
        assert_eq!(first.position, last.position);
        // Out and back along the line
        assert!((path.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_start_end_dummy_opens_the_tour() {
        let manager = line_manager(&[0.0, 1.0, 2.0, 3.0]);
        // Robot and lookahead collapse onto the start so only the
        // start/end dummy is wired
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(3));
        let selected = vec![
            ViewpointId(0),
            ViewpointId(1),
            ViewpointId(2),
            ViewpointId(3),
        ];
        let (path, ordered) = planner.solve_tsp(&manager, &selected).unwrap();

        assert_eq!(
            ordered,
            vec![
                ViewpointId(0),
                ViewpointId(1),
                ViewpointId(2),
                ViewpointId(3)
            ]
        );
        assert_eq!(path.nodes()[0].node_type, NodeType::Robot);
        assert_eq!(
            path.nodes().last().unwrap().node_type,
            NodeType::LocalPathEnd
        );
        // Open walk along the line, no return leg
        assert!((path.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_via_points_are_emitted_in_order() {
        let mut manager = line_manager(&[0.0, 3.0]);
        manager.set_path(
            ViewpointId(0),
            ViewpointId(1),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
            ],
        );
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(1));
        let (path, _) = planner
            .solve_tsp(&manager, &[ViewpointId(0), ViewpointId(1)])
            .unwrap();

        let vias: Vec<_> = path
            .nodes()
            .iter()
            .filter(|n| n.node_type == NodeType::LocalViaPoint)
            .collect();
        assert_eq!(vias.len(), 2);
        assert_eq!(vias[0].position, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(vias[1].position, Point3::new(2.0, 1.0, 0.0));
        assert!(vias.iter().all(|n| n.viewpoint.is_none()));
    }

    #[test]
    fn test_lookahead_with_rich_coverage_becomes_viewpoint() {
        let mut manager = GridViewpointManager::new(100.0);
        manager.add_viewpoint(Point3::new(0.0, 0.0, 0.0), vec![0], Vec::new());
        manager.add_viewpoint(
            Point3::new(1.0, 0.0, 0.0),
            (0..10).collect(),
            Vec::new(),
        );
        let config = CoverageConfig::new()
            .with_min_add_point_num(5)
            .with_min_add_frontier_point_num(5);
        let mut planner = LocalCoveragePlanner::new(config);
        planner.robot_viewpoint = Some(ViewpointId(0));
        planner.lookahead_viewpoint = Some(ViewpointId(1));
        planner.start_viewpoint = Some(ViewpointId(1));
        planner.end_viewpoint = Some(ViewpointId(1));

        let (path, _) = planner
            .solve_tsp(&manager, &[ViewpointId(0), ViewpointId(1)])
            .unwrap();
        // Leading occurrence of the lookahead re-examines its gains and
        // reports as a coverage viewpoint; the trailing occurrence stays
        // a plain lookahead node
        assert_eq!(path.nodes()[0].viewpoint, Some(ViewpointId(1)));
        assert_eq!(path.nodes()[0].node_type, NodeType::LocalViewpoint);
        let last = path.nodes().last().unwrap();
        assert_eq!(last.viewpoint, Some(ViewpointId(1)));
        assert_eq!(last.node_type, NodeType::LookaheadPoint);
    }

    #[test]
    fn test_unreachable_pair_uses_sentinel() {
        let mut manager = line_manager(&[0.0, 1.0]);
        manager.set_path(ViewpointId(0), ViewpointId(1), Vec::new());
        let mut planner =
            planner_with_anchors(ViewpointId(0), ViewpointId(0), ViewpointId(0), ViewpointId(0));
        // The tour still forms; the sentinel just dominates its length
        let (path, ordered) = planner
            .solve_tsp(&manager, &[ViewpointId(0), ViewpointId(1)])
            .unwrap();
        assert_eq!(ordered.len(), 2);
        assert!(!path.is_empty());
    }
}
