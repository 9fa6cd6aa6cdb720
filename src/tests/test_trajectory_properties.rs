//! Properties every planned trajectory must have, checked on random waypoints.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::kinematic_traits::Kinematics;
use crate::planning::optimizer::{PlannerConfig, TrajectoryOptimizer};
use crate::tests::test_utils::{assert_six_close, random_joints};
use crate::utils::{joints, reached, to_degrees, ARRIVAL_TOLERANCE_DEG};

fn random_waypoints(rng: &mut StdRng, count: usize) -> Vec<[f64; 6]> {
    (0..count).map(|_| to_degrees(&random_joints(rng, 150.0))).collect()
}

#[test]
fn test_random_waypoints_without_obstacles() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = PlannerConfig { obstacles: vec![], steps_between_waypoints: 5, ..PlannerConfig::default() };
    let optimizer = TrajectoryOptimizer::new(config);

    for case in 0..8 {
        let waypoints = random_waypoints(&mut rng, 2 + case % 3);
        let trajectory = optimizer.plan_trajectory(&waypoints)
            .unwrap_or_else(|err| panic!("Case {}: {}", case, err));

        assert_eq!(trajectory.len(), (waypoints.len() - 1) * 5 + 1);
        for (i, waypoint) in waypoints.iter().enumerate() {
            assert_six_close(waypoint, trajectory.waypoint_sample(i).unwrap(), 1e-3);
        }
        for sample in trajectory.samples() {
            assert!(sample.iter().all(|v| v.abs() <= 180.0 + 1e-6));
        }
    }
}

#[test]
fn test_random_waypoints_around_fixture() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = PlannerConfig::default();
    let robot = config.kinematics();
    let obstacle = config.obstacles[0];
    let min_clearance = config.min_clearance;
    let optimizer = TrajectoryOptimizer::new(config);

    for case in 0..4 {
        let waypoints = random_waypoints(&mut rng, 2);
        let trajectory = optimizer.plan_trajectory(&waypoints)
            .unwrap_or_else(|err| panic!("Case {}: {}", case, err));
        for (i, waypoint) in waypoints.iter().enumerate() {
            assert_six_close(waypoint, trajectory.waypoint_sample(i).unwrap(), 1e-3);
        }
        for sample in trajectory.to_radians() {
            let clearance = obstacle.clearance(&robot.tcp_position(&sample));
            assert!(clearance >= min_clearance - 1e-3,
                    "Case {}: clearance {} below {}", case, clearance, min_clearance);
        }
    }
}

#[test]
fn test_execution_reaches_every_sample() {
    // The execution layer sends each sample and waits until the joints arrive there.
    let optimizer = TrajectoryOptimizer::default();
    let waypoints = [[0.0; 6], [90.0; 6]];
    let trajectory = optimizer.plan_trajectory(&waypoints).unwrap();

    let mut measured = [0.0; 6];
    for (k, target) in trajectory.samples().iter().enumerate() {
        if k > 0 {
            // Consecutive samples are 30 degrees apart, the robot is still on its way.
            assert!(!reached(&measured, target, ARRIVAL_TOLERANCE_DEG));
        }
        measured = target.map(|v| v + 0.25);
        assert!(reached(&measured, target, ARRIVAL_TOLERANCE_DEG));
    }
    assert!(reached(&measured, &waypoints[1], ARRIVAL_TOLERANCE_DEG));
}

#[test]
fn test_degrees_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let radians = random_joints(&mut rng, 180.0);
        let back = joints(&to_degrees(&radians));
        assert_six_close(&radians, &back, 1e-12);
    }
}
