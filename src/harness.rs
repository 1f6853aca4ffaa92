//! Synthetic viewpoint manager for tests and benchmarks.
//!
//! [`GridViewpointManager`] implements [`ViewpointManager`] over a plain
//! vector of hand-placed viewpoints. Logical ids and array indices
//! coincide, nearest-candidate lookup is a linear scan, and shortest
//! paths default to straight segments unless overridden, so path lengths
//! equal the Euclidean distances the tour builder scales into the TSP
//! matrix.

use std::collections::HashMap;

use crate::core::Point3;
use crate::viewpoint::{ArrayInd, ViewpointId, ViewpointManager, ViewpointRef};

/// One synthetic viewpoint.
#[derive(Clone, Debug)]
struct SyntheticViewpoint {
    position: Point3,
    surface_points: Vec<usize>,
    frontier_points: Vec<usize>,
    candidate: bool,
    visited: bool,
    exploring: bool,
    selected: bool,
}

/// In-memory viewpoint manager with identity id/index mapping.
#[derive(Clone, Debug, Default)]
pub struct GridViewpointManager {
    viewpoints: Vec<SyntheticViewpoint>,
    horizon_center: Point3,
    horizon_radius: f32,
    path_overrides: HashMap<(usize, usize), Vec<Point3>>,
}

impl GridViewpointManager {
    /// Create a manager with the given local planning horizon radius
    /// around the origin.
    pub fn new(horizon_radius: f32) -> Self {
        Self {
            viewpoints: Vec::new(),
            horizon_center: Point3::ZERO,
            horizon_radius,
            path_overrides: HashMap::new(),
        }
    }

    /// Add a candidate viewpoint and return its id.
    pub fn add_viewpoint(
        &mut self,
        position: Point3,
        surface_points: Vec<usize>,
        frontier_points: Vec<usize>,
    ) -> ViewpointId {
        self.viewpoints.push(SyntheticViewpoint {
            position,
            surface_points,
            frontier_points,
            candidate: true,
            visited: false,
            exploring: true,
            selected: false,
        });
        ViewpointId(self.viewpoints.len() - 1)
    }

    /// Mark a viewpoint as visited or not.
    pub fn set_visited(&mut self, id: ViewpointId, visited: bool) {
        self.viewpoints[id.0].visited = visited;
    }

    /// Toggle a viewpoint's candidacy.
    pub fn set_candidate(&mut self, id: ViewpointId, candidate: bool) {
        self.viewpoints[id.0].candidate = candidate;
    }

    /// Toggle whether a viewpoint sits in an exploring cell.
    pub fn set_exploring(&mut self, id: ViewpointId, exploring: bool) {
        self.viewpoints[id.0].exploring = exploring;
    }

    /// Shrink or grow the local planning horizon.
    pub fn set_horizon_radius(&mut self, radius: f32) {
        self.horizon_radius = radius;
    }

    /// Move the local planning horizon center.
    pub fn set_horizon_center(&mut self, center: Point3) {
        self.horizon_center = center;
    }

    /// Override the shortest path between two viewpoints (both
    /// directions). An empty pose list models an unreachable pair.
    pub fn set_path(&mut self, a: ViewpointId, b: ViewpointId, poses: Vec<Point3>) {
        self.path_overrides.insert((a.0, b.0), poses);
    }

    /// Read a viewpoint's `selected` flag back.
    pub fn selected(&self, id: ViewpointId) -> bool {
        self.viewpoints[id.0].selected
    }

    fn index(&self, vp: ViewpointRef) -> usize {
        let index = match vp {
            ViewpointRef::Id(id) => id.0,
            ViewpointRef::Array(ind) => ind.0,
        };
        assert!(index < self.viewpoints.len(), "viewpoint {index} out of range");
        index
    }
}

impl ViewpointManager for GridViewpointManager {
    fn viewpoint_count(&self) -> usize {
        self.viewpoints.len()
    }

    fn candidate_ids(&self) -> Vec<ViewpointId> {
        self.viewpoints
            .iter()
            .enumerate()
            .filter(|(_, vp)| vp.candidate)
            .map(|(i, _)| ViewpointId(i))
            .collect()
    }

    fn nearest_candidate(&self, position: Point3) -> Option<ViewpointId> {
        self.viewpoints
            .iter()
            .enumerate()
            .filter(|(_, vp)| vp.candidate)
            .min_by(|(_, a), (_, b)| {
                a.position
                    .distance_squared(&position)
                    .partial_cmp(&b.position.distance_squared(&position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| ViewpointId(i))
    }

    fn in_local_planning_horizon(&self, position: Point3) -> bool {
        self.horizon_center.distance(&position) <= self.horizon_radius
    }

    fn in_range(&self, id: ViewpointId) -> bool {
        id.0 < self.viewpoints.len()
    }

    fn is_candidate(&self, vp: ViewpointRef) -> bool {
        self.viewpoints[self.index(vp)].candidate
    }

    fn visited(&self, vp: ViewpointRef) -> bool {
        self.viewpoints[self.index(vp)].visited
    }

    fn in_exploring_cell(&self, id: ViewpointId) -> bool {
        self.viewpoints[id.0].exploring
    }

    fn array_ind(&self, id: ViewpointId) -> ArrayInd {
        ArrayInd(id.0)
    }

    fn viewpoint_id(&self, array_ind: ArrayInd) -> ViewpointId {
        ViewpointId(array_ind.0)
    }

    fn covered_surface_points(&self, vp: ViewpointRef) -> &[usize] {
        &self.viewpoints[self.index(vp)].surface_points
    }

    fn covered_frontier_points(&self, vp: ViewpointRef) -> &[usize] {
        &self.viewpoints[self.index(vp)].frontier_points
    }

    fn position(&self, id: ViewpointId) -> Point3 {
        self.viewpoints[id.0].position
    }

    fn shortest_path(&self, from: ViewpointId, to: ViewpointId) -> Vec<Point3> {
        if let Some(poses) = self.path_overrides.get(&(from.0, to.0)) {
            return poses.clone();
        }
        if let Some(poses) = self.path_overrides.get(&(to.0, from.0)) {
            let mut reversed = poses.clone();
            reversed.reverse();
            return reversed;
        }
        vec![self.position(from), self.position(to)]
    }

    fn set_selected(&mut self, vp: ViewpointRef, selected: bool) {
        let index = self.index(vp);
        self.viewpoints[index].selected = selected;
    }
}
