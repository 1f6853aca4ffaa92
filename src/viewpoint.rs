//! Viewpoint handles and the viewpoint manager contract.
//!
//! The planner never owns viewpoint geometry. Candidacy, visibility
//! sets, shortest paths, and the `selected` flag are all reached through
//! the [`ViewpointManager`] trait, which the surrounding stack
//! implements over its viewpoint grid.

use serde::{Deserialize, Serialize};

use crate::core::Point3;
use crate::coverage::CoverageBitmap;

/// Logical viewpoint handle assigned by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewpointId(pub usize);

/// Dense array index of a viewpoint; converts to and from [`ViewpointId`]
/// in O(1) through the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArrayInd(pub usize);

/// Either addressing mode accepted at the manager boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewpointRef {
    /// Logical id
    Id(ViewpointId),
    /// Dense array index
    Array(ArrayInd),
}

impl From<ViewpointId> for ViewpointRef {
    fn from(id: ViewpointId) -> Self {
        ViewpointRef::Id(id)
    }
}

impl From<ArrayInd> for ViewpointRef {
    fn from(ind: ArrayInd) -> Self {
        ViewpointRef::Array(ind)
    }
}

/// Query interface over the viewpoint catalog.
///
/// The planner reads candidacy, visibility, and shortest paths, and writes
/// exactly one thing back: the per-viewpoint `selected` flag. It assumes
/// exclusive access to that flag for the duration of a planning call.
pub trait ViewpointManager {
    /// Total number of viewpoints (candidates or not).
    fn viewpoint_count(&self) -> usize;

    /// Ids of all current candidate viewpoints.
    fn candidate_ids(&self) -> Vec<ViewpointId>;

    /// Candidate nearest to `position`, `None` when no candidates exist.
    fn nearest_candidate(&self, position: Point3) -> Option<ViewpointId>;

    /// Whether `position` lies inside the local planning horizon.
    fn in_local_planning_horizon(&self, position: Point3) -> bool;

    /// Whether `id` refers to a viewpoint inside the manager's grid.
    fn in_range(&self, id: ViewpointId) -> bool;

    /// Whether the viewpoint is currently a candidate.
    fn is_candidate(&self, vp: ViewpointRef) -> bool;

    /// Whether the viewpoint has already been visited.
    fn visited(&self, vp: ViewpointRef) -> bool;

    /// Whether the viewpoint lies in a cell still flagged as exploring.
    fn in_exploring_cell(&self, id: ViewpointId) -> bool;

    /// Dense array index of `id`.
    fn array_ind(&self, id: ViewpointId) -> ArrayInd;

    /// Logical id of `array_ind`.
    fn viewpoint_id(&self, array_ind: ArrayInd) -> ViewpointId;

    /// Surface point indices observed from the viewpoint.
    fn covered_surface_points(&self, vp: ViewpointRef) -> &[usize];

    /// Frontier point indices observed from the viewpoint.
    fn covered_frontier_points(&self, vp: ViewpointRef) -> &[usize];

    /// World position of the viewpoint.
    fn position(&self, id: ViewpointId) -> Point3;

    /// Collision-free shortest path between two viewpoints, as a pose
    /// sequence including both endpoints. Empty when no path exists.
    fn shortest_path(&self, from: ViewpointId, to: ViewpointId) -> Vec<Point3>;

    /// Set or clear the `selected` flag.
    fn set_selected(&mut self, vp: ViewpointRef, selected: bool);

    /// Number of surface points the viewpoint observes in total.
    fn surface_point_count(&self, vp: ViewpointRef) -> usize {
        self.covered_surface_points(vp).len()
    }

    /// Number of frontier points the viewpoint observes in total.
    fn frontier_point_count(&self, vp: ViewpointRef) -> usize {
        self.covered_frontier_points(vp).len()
    }

    /// Marginal surface points the viewpoint would add over `covered`.
    fn surface_gain(&self, covered: &CoverageBitmap, vp: ViewpointRef) -> usize {
        covered.uncovered_in(self.covered_surface_points(vp))
    }

    /// Marginal frontier points the viewpoint would add over `covered`.
    fn frontier_gain(&self, covered: &CoverageBitmap, vp: ViewpointRef) -> usize {
        covered.uncovered_in(self.covered_frontier_points(vp))
    }
}
