//! Joint-space trajectory optimization for six-axis serial robots described by
//! Denavit-Hartenberg parameters.
//!
//! Given a list of waypoints (joint angles in degrees), the planner computes a sampled
//! trajectory that passes through every waypoint exactly, keeps every joint within its limits,
//! keeps the tool center point at a minimal distance from axis aligned keep-out boxes, and
//! minimizes the sum of squared joint increments between consecutive samples.
//!
//! # Features
//!
//! - Forward kinematics and analytic position Jacobian for DH chains with a tool offset
//!   (UR3, UR5 and UR10 parameters built in).
//! - The trajectory is a nonlinear program solved with the augmented Lagrangian method and the
//!   PANOC inner solver of `optimization_engine`. The backend can be replaced through the
//!   `NlpSolver` trait.
//! - Waypoints that are themselves infeasible are reported before any numerical work.
//! - Planning parameters (robot, tool, discretization, limits, obstacles, clearance) are a
//!   `PlannerConfig` value that can be read from a YAML workcell description.
//!
//! ## Example
//!
//! ```no_run
//! use rs_trajopt::planning::optimizer::TrajectoryOptimizer;
//!
//! let optimizer = TrajectoryOptimizer::default();
//! let trajectory = optimizer.plan_trajectory(&[[0.0; 6], [90.0; 6]]).unwrap();
//! for sample in trajectory.samples() {
//!     println!("{:?}", sample);
//! }
//! ```

pub mod parameters;
pub mod parameters_robots;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod constraints;

pub mod jacobian;

pub mod obstacle;

pub mod planning_error;

#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

#[path = "path_plan/interpolator.rs"]
pub mod interpolator;

pub mod planning {
    pub mod request;
    pub mod trajectory_problem;
    pub mod solver;
    pub mod optimizer;
}
