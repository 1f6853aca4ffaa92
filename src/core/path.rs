//! Exploration path representation.
//!
//! An [`ExplorationPath`] is an ordered sequence of typed nodes. The same
//! type carries the coarse global path consumed by the planner and the
//! local coverage path it emits.

use serde::{Deserialize, Serialize};

use super::point::Point3;
use crate::viewpoint::ViewpointId;

/// Position tolerance when collapsing consecutive duplicate nodes (meters).
const NODE_POSITION_EPSILON: f32 = 1e-4;

/// Role of a node within an exploration path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Viewpoint nearest to the robot position
    Robot,
    /// First handoff to the global path
    LocalPathStart,
    /// Second handoff to the global path
    LocalPathEnd,
    /// Selected coverage viewpoint
    LocalViewpoint,
    /// Lookahead target that does not contribute coverage
    LookaheadPoint,
    /// Intermediate pose on the shortest path between two viewpoints
    LocalViaPoint,
    /// Viewpoint on the global tour (input path only)
    GlobalViewpoint,
    /// Intermediate pose on the global tour (input path only)
    GlobalViaPoint,
    /// The home position (input path only)
    Home,
}

/// A single node of an exploration path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    /// Node position in world frame
    pub position: Point3,
    /// Node role
    pub node_type: NodeType,
    /// Source viewpoint, `None` for via-points
    pub viewpoint: Option<ViewpointId>,
}

impl PathNode {
    /// Create a viewpoint-backed node.
    pub fn viewpoint(position: Point3, node_type: NodeType, id: ViewpointId) -> Self {
        Self {
            position,
            node_type,
            viewpoint: Some(id),
        }
    }

    /// Create a via-point node (no source viewpoint).
    pub fn via_point(position: Point3) -> Self {
        Self {
            position,
            node_type: NodeType::LocalViaPoint,
            viewpoint: None,
        }
    }

    /// Create a via-point node on the global tour (no source viewpoint).
    pub fn global_via_point(position: Point3) -> Self {
        Self {
            position,
            node_type: NodeType::GlobalViaPoint,
            viewpoint: None,
        }
    }
}

/// Ordered sequence of path nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExplorationPath {
    nodes: Vec<PathNode>,
}

impl ExplorationPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a path from a node sequence.
    ///
    /// Nodes are appended one by one, so consecutive duplicates collapse.
    pub fn from_nodes(nodes: Vec<PathNode>) -> Self {
        let mut path = Self::new();
        for node in nodes {
            path.push(node);
        }
        path
    }

    /// Append a node, skipping it when it sits at the same position as the
    /// current last node.
    pub fn push(&mut self, node: PathNode) {
        if self
            .nodes
            .last()
            .is_none_or(|last| !last.position.approx_eq(node.position, NODE_POSITION_EPSILON))
        {
            self.nodes.push(node);
        }
    }

    /// Nodes in order.
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the path has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total Euclidean length over consecutive nodes (meters).
    pub fn length(&self) -> f32 {
        self.nodes
            .windows(2)
            .map(|w| w[0].position.distance(&w[1].position))
            .sum()
    }

    /// Reverse the node order in place.
    pub fn reverse(&mut self) {
        self.nodes.reverse();
    }
}
