//! # Disha-Plan: Local Coverage Planning for Robot Exploration
//!
//! A local coverage planner for mobile-robot exploration stacks. Given
//! the robot pose, a short-horizon lookahead target, a catalog of
//! candidate viewpoints annotated with the surface and frontier points
//! each would observe, and the coarse global path through the local
//! region, the planner produces an ordered local path that covers as
//! many uncovered points as possible while handing off to the global
//! path at both ends.
//!
//! ## Pipeline
//!
//! ```text
//!  ┌──────────────┐   ┌───────────────┐   ┌────────────────┐
//!  │ Global path  │   │  Robot pose + │   │   Viewpoint    │
//!  │  (handoffs)  │   │   lookahead   │   │    manager     │
//!  └──────┬───────┘   └───────┬───────┘   └───────┬────────┘
//!         │                   │                   │
//!         └───────── anchors ─┴─────┐             │ candidates,
//!                                   ▼             │ visibility sets,
//!                          ┌────────────────┐     │ shortest paths
//!                          │ Coverage       │◄────┘
//!                          │ ranking +      │
//!                          │ randomized     │
//!                          │ greedy select  │
//!                          └───────┬────────┘
//!                                  │ selected viewpoints
//!                                  ▼
//!                          ┌────────────────┐
//!                          │ TSP sequencing │──► LocalPath with typed
//!                          │ (dummy-node    │    nodes and via-points
//!                          │  anchoring)    │
//!                          └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use disha_plan::{CoverageConfig, LocalCoveragePlanner, Point3};
//! use disha_plan::core::ExplorationPath;
//! use disha_plan::harness::GridViewpointManager;
//!
//! let mut manager = GridViewpointManager::new(50.0);
//! manager.add_viewpoint(Point3::new(1.0, 0.0, 0.0), vec![0, 1, 2], vec![]);
//!
//! let config = CoverageConfig::new().with_min_add_point_num(2);
//! let mut planner = LocalCoveragePlanner::new(config);
//! planner.set_robot_position(Point3::ZERO);
//!
//! let path = planner.solve_local_coverage(&mut manager, &ExplorationPath::new(), 3, 0);
//! println!("{} nodes, {:.2}m", path.len(), path.length());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: path and point types shared with the surrounding stack
//! - [`coverage`]: coverage bitmaps and gain queues
//! - [`viewpoint`]: the viewpoint manager contract
//! - [`tsp`]: the TSP solver contract and the built-in heuristic solver
//! - [`planner`]: anchor resolution, greedy selection, tour building
//! - [`config`]: planner configuration
//! - [`harness`]: synthetic viewpoint manager for tests and benchmarks
//!
//! The planner is a single-threaded synchronous routine called once per
//! planning tick; its only cross-call state is the viewpoint order of
//! the previous winning tour.

pub mod config;
pub mod core;
pub mod coverage;
pub mod error;
pub mod harness;
pub mod planner;
pub mod tsp;
pub mod viewpoint;

// Re-export main types at crate root
pub use crate::config::CoverageConfig;
pub use crate::core::{ExplorationPath, NodeType, PathNode, Point3};
pub use crate::error::{PlannerError, Result};
pub use crate::planner::{LocalCoveragePlanner, SelectedViewpointClass};
pub use crate::tsp::{GreedyTwoOptSolver, TspSolution, TspSolver};
pub use crate::viewpoint::{ArrayInd, ViewpointId, ViewpointManager, ViewpointRef};
