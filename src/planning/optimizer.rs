//! Plans a joint-space trajectory through waypoints given in degrees.

use crate::constraints::Constraints;
use crate::kinematic_traits::{Joints, JOINT_COUNT};
use crate::kinematics_impl::{DhKinematics, DEFAULT_TCP_OFFSET};
use crate::obstacle::ObstacleBox;
use crate::parameters::dh_kinematics::DhParameters;
use crate::planning::request::PlanningRequest;
use crate::planning::solver::{AlmSolver, NlpSolver};
use crate::planning::trajectory_problem::TrajectoryProblem;
use crate::planning_error::PlanningError;
use crate::utils::{format_degrees, joints, max_joint_difference, to_degrees};
use nalgebra::DMatrix;
use tracing::{info, warn};

/// Default number of samples from one waypoint to the next.
pub const DEFAULT_STEPS_BETWEEN_WAYPOINTS: usize = 3;

/// Default distance the tool must keep from every obstacle, meters.
pub const DEFAULT_MIN_CLEARANCE: f64 = 0.05;

/// Robot, workcell and discretization used by every planning call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub parameters: DhParameters,

    /// Tool center point offset along the flange Z axis, meters.
    pub tcp_offset: f64,

    pub steps_between_waypoints: usize,

    /// Joint limits, radians.
    pub limits: Constraints,

    pub obstacles: Vec<ObstacleBox>,

    /// Meters.
    pub min_clearance: f64,
}

impl Default for PlannerConfig {
    /// UR10 with a 200 mm tool, 3 steps per segment, joints within +/- 180 degrees and the
    /// fixture box of the workcell with 5 cm clearance.
    fn default() -> Self {
        PlannerConfig {
            parameters: DhParameters::ur10(),
            tcp_offset: DEFAULT_TCP_OFFSET,
            steps_between_waypoints: DEFAULT_STEPS_BETWEEN_WAYPOINTS,
            limits: Constraints::default(),
            obstacles: vec![ObstacleBox::workcell_fixture()],
            min_clearance: DEFAULT_MIN_CLEARANCE,
        }
    }
}

impl PlannerConfig {
    pub fn kinematics(&self) -> DhKinematics {
        DhKinematics::new(self.parameters, self.tcp_offset)
    }
}

/// Planned trajectory, joint values in degrees. Sample `i * steps_between_waypoints` is
/// waypoint `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectory {
    samples: Vec<[f64; 6]>,
    steps_between_waypoints: usize,
}

impl JointTrajectory {
    pub fn new(samples: Vec<[f64; 6]>, steps_between_waypoints: usize) -> Self {
        JointTrajectory { samples, steps_between_waypoints }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[[f64; 6]] {
        &self.samples
    }

    pub fn sample(&self, k: usize) -> Option<&[f64; 6]> {
        self.samples.get(k)
    }

    /// The sample pinned to waypoint `i`.
    pub fn waypoint_sample(&self, i: usize) -> Option<&[f64; 6]> {
        self.samples.get(i * self.steps_between_waypoints)
    }

    pub fn steps_between_waypoints(&self) -> usize {
        self.steps_between_waypoints
    }

    /// Samples as a 6 x N matrix, one column per sample.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let data: Vec<f64> = self.samples.iter().flatten().copied().collect();
        DMatrix::from_column_slice(JOINT_COUNT, self.samples.len(), &data)
    }

    pub fn to_radians(&self) -> Vec<Joints> {
        self.samples.iter().map(joints).collect()
    }

    /// Prints one line per sample, joint values in degrees.
    pub fn dump(&self) {
        crate::utils::dump_trajectory_degrees(&self.samples);
    }
}

/// Stateless planner: each call builds and solves its own program.
pub struct TrajectoryOptimizer<S: NlpSolver = AlmSolver> {
    config: PlannerConfig,
    kinematics: DhKinematics,
    solver: S,
}

impl TrajectoryOptimizer<AlmSolver> {
    pub fn new(config: PlannerConfig) -> Self {
        Self::with_solver(config, AlmSolver::default())
    }
}

impl Default for TrajectoryOptimizer<AlmSolver> {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl<S: NlpSolver> TrajectoryOptimizer<S> {
    pub fn with_solver(config: PlannerConfig, solver: S) -> Self {
        let kinematics = config.kinematics();
        TrajectoryOptimizer { config, kinematics, solver }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn kinematics(&self) -> &DhKinematics {
        &self.kinematics
    }

    /// Plans a trajectory through the waypoints, each exactly six joint values in degrees.
    /// The result has `(waypoints - 1) * steps + 1` samples, also in degrees.
    pub fn plan_trajectory<W: AsRef<[f64]>>(&self, waypoints_deg: &[W])
                                            -> Result<JointTrajectory, PlanningError> {
        let radians: Vec<Vec<f64>> = waypoints_deg.iter()
            .map(|w| w.as_ref().iter().map(|v| v.to_radians()).collect())
            .collect();
        self.plan(&radians)
    }

    /// Same as [`Self::plan_trajectory`] with waypoints in radians.
    pub fn plan_trajectory_joints(&self, waypoints: &[Joints])
                                  -> Result<JointTrajectory, PlanningError> {
        self.plan(waypoints)
    }

    fn plan<W: AsRef<[f64]>>(&self, waypoints: &[W]) -> Result<JointTrajectory, PlanningError> {
        let config = &self.config;
        let request = PlanningRequest::new(
            waypoints,
            config.steps_between_waypoints,
            config.limits.clone(),
            config.obstacles.clone(),
            config.min_clearance,
        )?;
        let problem = TrajectoryProblem::build(request, &self.kinematics)?;
        info!("Planning {} samples through {} waypoints, {} clearance constraints",
            problem.sample_count(), problem.request().waypoints().len(), problem.constraint_count());

        let solution = self.solver.solve(&problem).inspect_err(|err| {
            warn!("Planning failed: {}", err);
        })?;

        let columns = problem.columns(&solution);
        let largest_step = columns.windows(2)
            .map(|pair| max_joint_difference(&pair[0], &pair[1]))
            .fold(0.0, f64::max);
        info!("Planned {} samples, largest joint step {:.2} deg, cost {:.6}",
            columns.len(), largest_step.to_degrees(), problem.cost(&solution));

        let samples: Vec<[f64; 6]> = columns.iter().map(to_degrees).collect();
        for (k, sample) in samples.iter().enumerate() {
            info!("Sample {}: {}", k, format_degrees(sample));
        }
        Ok(JointTrajectory::new(samples, config.steps_between_waypoints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::Kinematics;

    fn assert_pinned(trajectory: &JointTrajectory, waypoints: &[[f64; 6]]) {
        for (i, waypoint) in waypoints.iter().enumerate() {
            let sample = trajectory.waypoint_sample(i).unwrap();
            for j in 0..6 {
                assert!((sample[j] - waypoint[j]).abs() < 1e-3,
                        "waypoint {} joint {}: {} vs {}", i, j, sample[j], waypoint[j]);
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.steps_between_waypoints, 3);
        assert_eq!(config.min_clearance, 0.05);
        assert_eq!(config.obstacles.len(), 1);
        assert_eq!(config.obstacles[0].extents(), [-0.095, 0.115, -0.76, -0.70, 0.125, 0.325]);
        assert_eq!(config.parameters, DhParameters::ur10());
    }

    #[test]
    fn test_scenario_zero_to_ninety() {
        let optimizer = TrajectoryOptimizer::default();
        let waypoints = [[0.0; 6], [90.0; 6]];
        let trajectory = optimizer.plan_trajectory(&waypoints).unwrap();
        assert_eq!(trajectory.len(), 4);
        assert_pinned(&trajectory, &waypoints);
        for j in 0..6 {
            let column: Vec<f64> = trajectory.samples().iter().map(|s| s[j]).collect();
            assert!(column.windows(2).all(|w| w[1] >= w[0] - 1e-3), "joint {} not monotone", j);
            assert!(column.iter().all(|v| v.abs() <= 180.0 + 1e-6));
            // Nothing near the path, so the optimum is the straight line.
            assert!((column[1] - 30.0).abs() < 0.1);
            assert!((column[2] - 60.0).abs() < 0.1);
        }
        let matrix = trajectory.to_matrix();
        assert_eq!(matrix.shape(), (6, 4));
        assert!((matrix[(2, 3)] - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_waypoint_is_format_error() {
        let optimizer = TrajectoryOptimizer::default();
        let result = optimizer.plan_trajectory(&[[0.0; 6]]);
        assert!(matches!(result, Err(PlanningError::FormatError(_))));
    }

    #[test]
    fn test_waypoint_with_five_values_is_format_error() {
        let optimizer = TrajectoryOptimizer::default();
        let result = optimizer.plan_trajectory(&[vec![0.0; 6], vec![0.0; 5]]);
        assert!(matches!(result, Err(PlanningError::FormatError(_))));
    }

    #[test]
    fn test_waypoint_inside_obstacle_is_rejected() {
        let robot = PlannerConfig::default().kinematics();
        let tcp = robot.tcp_position(&[0.0; 6]);
        let config = PlannerConfig {
            obstacles: vec![ObstacleBox::new(tcp.x - 0.1, tcp.x + 0.1, tcp.y - 0.1, tcp.y + 0.1,
                                             tcp.z - 0.1, tcp.z + 0.1)],
            ..PlannerConfig::default()
        };
        let optimizer = TrajectoryOptimizer::new(config);
        let result = optimizer.plan_trajectory(&[[0.0; 6], [90.0; 6]]);
        assert!(matches!(result, Err(PlanningError::InfeasibleProblem(_))));
    }

    #[test]
    fn test_no_obstacles_gives_interpolation() {
        let config = PlannerConfig { obstacles: vec![], steps_between_waypoints: 4, ..PlannerConfig::default() };
        let optimizer = TrajectoryOptimizer::new(config);
        let waypoints = [[0.0, -90.0, 0.0, -90.0, 0.0, 0.0], [40.0, -50.0, 80.0, -10.0, 20.0, 120.0],
            [-40.0, -90.0, 0.0, -90.0, 0.0, 0.0]];
        let trajectory = optimizer.plan_trajectory(&waypoints).unwrap();
        assert_eq!(trajectory.len(), 9);
        assert_pinned(&trajectory, &waypoints);
        for segment in 0..2 {
            for step in 1..4 {
                let t = step as f64 / 4.0;
                let sample = trajectory.sample(segment * 4 + step).unwrap();
                for j in 0..6 {
                    let expected = waypoints[segment][j]
                        + t * (waypoints[segment + 1][j] - waypoints[segment][j]);
                    assert!((sample[j] - expected).abs() < 0.05);
                }
            }
        }
    }

    #[test]
    fn test_obstacle_on_straight_path() {
        // Waypoints on both sides of a box that the straight line would cross.
        let robot = PlannerConfig::default().kinematics();
        let mid = robot.tcp_position(&joints(&[90.0, -90.0, 0.0, -90.0, 0.0, 0.0]));
        let config = PlannerConfig {
            obstacles: vec![ObstacleBox::new(mid.x - 0.05, mid.x + 0.05, mid.y - 0.05, mid.y + 0.05,
                                             mid.z - 0.05, mid.z + 0.05)],
            ..PlannerConfig::default()
        };
        let min_clearance = config.min_clearance;
        let obstacle = config.obstacles[0];
        let waypoints = [[45.0, -90.0, 0.0, -90.0, 0.0, 0.0], [135.0, -90.0, 0.0, -90.0, 0.0, 0.0]];

        for steps in [6, 5, 3] {
            let optimizer = TrajectoryOptimizer::new(PlannerConfig {
                steps_between_waypoints: steps,
                ..config.clone()
            });
            let trajectory = optimizer.plan_trajectory(&waypoints)
                .unwrap_or_else(|err| panic!("{} steps: {}", steps, err));
            assert_eq!(trajectory.len(), steps + 1);
            assert_pinned(&trajectory, &waypoints);
            for sample in trajectory.to_radians() {
                let clearance = obstacle.clearance(&robot.tcp_position(&sample));
                assert!(clearance >= min_clearance - 1e-3, "{} steps: clearance {}", steps, clearance);
                assert!(sample.iter().all(|q| q.abs() <= std::f64::consts::PI + 1e-6));
            }
        }
    }

    #[test]
    fn test_radian_entry_point() {
        let optimizer = TrajectoryOptimizer::default();
        let start = joints(&[0.0; 6]);
        let end = joints(&[30.0; 6]);
        let trajectory = optimizer.plan_trajectory_joints(&[start, end]).unwrap();
        assert!((trajectory.samples()[3][0] - 30.0).abs() < 1e-3);
        assert!((trajectory.to_radians()[3][5] - end[5]).abs() < 1e-9);
    }

    #[test]
    fn test_optimizer_is_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<TrajectoryOptimizer>();
    }
}
