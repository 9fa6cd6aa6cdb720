extern crate nalgebra as na;
use na::{Matrix3x6, Vector3, Vector6};
use crate::kinematic_traits::{Joints, Kinematics};
use crate::utils::vector6_to_joints;

/// Disturbance used by the finite difference Jacobian when nothing else is specified.
pub const DEFAULT_EPSILON: f64 = 1e-7;

/// Struct representing the position part of the manipulator Jacobian
pub struct Jacobian {
    /// A 3x6 matrix mapping joint velocities to the linear velocity of the tool center point.
    /// Each column corresponds to a joint, each row to one Cartesian axis.
    matrix: Matrix3x6<f64>,
}

impl Jacobian {
    /// Constructs the Jacobian for the given robot and joint configuration, using whatever
    /// derivative the robot provides (analytic for the DH chain).
    pub fn new<K: Kinematics + ?Sized>(robot: &K, qs: &Joints) -> Self {
        Self { matrix: robot.position_jacobian(qs) }
    }

    pub fn matrix(&self) -> &Matrix3x6<f64> {
        &self.matrix
    }

    /// Maps a gradient taken with respect to the tcp position into the gradient with
    /// respect to the joints (`J^T * g`). This is the same product that turns a tip force
    /// into joint torques.
    pub fn joint_gradient(&self, cartesian_gradient: &Vector3<f64>) -> Joints {
        let joint_gradient: Vector6<f64> = self.matrix.transpose() * cartesian_gradient;
        vector6_to_joints(joint_gradient)
    }
}

/// Function to compute the position Jacobian for a given robot and joint configuration
/// by forward differences.
///
/// # Arguments
///
/// * `robot` - A reference to the robot implementing the Kinematics trait
/// * `joints` - A reference to the joint configuration
/// * `epsilon` - A small value used for numerical differentiation
///
/// # Returns
///
/// A 3x6 matrix, column `i` is the derivative of the tcp position by joint `i`.
pub fn compute_position_jacobian<K: Kinematics + ?Sized>(robot: &K, joints: &Joints,
                                                         epsilon: f64) -> Matrix3x6<f64> {
    let mut jacobian = Matrix3x6::zeros();
    let current_position = robot.forward(joints).translation.vector;

    for i in 0..6 {
        let mut perturbed_qs = *joints;
        perturbed_qs[i] += epsilon;
        let perturbed_position = robot.forward(&perturbed_qs).translation.vector;
        let delta_position = (perturbed_position - current_position) / epsilon;
        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&delta_position);
    }

    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::Pose;
    use na::{Isometry3, Translation3, UnitQuaternion};

    const EPSILON: f64 = 1e-6;

    /// Example implementation of the Kinematics trait for a single rotary joint robot
    /// When the first joint rotates, the tip of the unit length arm moves along Y.
    /// No other joint affects the end-effector in this simple robot model.
    pub struct SingleRotaryJointRobot;

    impl Kinematics for SingleRotaryJointRobot {
        fn forward(&self, qs: &Joints) -> Pose {
            let angle = qs[0];
            let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, angle);
            let translation = Translation3::new(angle.cos(), angle.sin(), 0.0);
            Isometry3::from_parts(translation, rotation)
        }
    }

    fn assert_matrix_approx_eq(left: &Matrix3x6<f64>, right: &Matrix3x6<f64>, epsilon: f64) {
        for i in 0..3 {
            for j in 0..6 {
                assert!((left[(i, j)] - right[(i, j)]).abs() < epsilon, "left[{0},{1}] = {2} is not approximately equal to right[{0},{1}] = {3}", i, j, left[(i, j)], right[(i, j)]);
            }
        }
    }

    #[test]
    fn test_compute_position_jacobian() {
        let robot = SingleRotaryJointRobot;
        let joints: Joints = [0.0; 6];
        let jacobian = compute_position_jacobian(&robot, &joints, EPSILON);
        let mut expected_jacobian = Matrix3x6::zeros();
        expected_jacobian[(1, 0)] = 1.0; // Y position is affected by the first joint

        assert_matrix_approx_eq(&jacobian, &expected_jacobian, 1e-5);
    }

    #[test]
    fn test_default_trait_jacobian_is_numeric() {
        let robot = SingleRotaryJointRobot;
        let joints: Joints = [std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, 0.0];
        let jacobian = Jacobian::new(&robot, &joints);
        // At 90 degrees the tip moves in the negative X direction.
        assert!((jacobian.matrix()[(0, 0)] + 1.0).abs() < 1e-5);
        assert!(jacobian.matrix()[(1, 0)].abs() < 1e-5);
    }

    #[test]
    fn test_joint_gradient() {
        let robot = SingleRotaryJointRobot;
        let jacobian = Jacobian::new(&robot, &[0.0; 6]);

        // Pulling the tip along Y is fully resisted by the first joint.
        let gradient = jacobian.joint_gradient(&Vector3::new(0.0, 1.234, 0.0));
        assert!((gradient[0] - 1.234).abs() < 1e-5);
        for g in &gradient[1..] {
            assert!(g.abs() < 1e-12);
        }
    }
}
