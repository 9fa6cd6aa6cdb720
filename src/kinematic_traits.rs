//! Defines the Kinematics trait and the data types shared across the crate.

extern crate nalgebra as na;

use na::{Isometry3, Matrix3x6, Vector3};

/// Pose is used a pose of the robot tcp. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Six rotary joints of the robot, radians unless stated otherwise.
pub type Joints = [f64; 6];

/// Number of joints of the robot model this crate plans for.
pub const JOINT_COUNT: usize = 6;

/// All joints at zero.
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

pub trait Kinematics: Send + Sync {
    /// Pose of the tool center point for the given joint angles.
    fn forward(&self, qs: &Joints) -> Pose;

    /// Cartesian position of the tool center point. Defined for any finite input,
    /// joint limits are not checked here.
    fn tcp_position(&self, qs: &Joints) -> Vector3<f64> {
        self.forward(qs).translation.vector
    }

    /// Derivative of the tcp position with respect to each joint, one column per joint.
    /// The default implementation uses forward differences.
    fn position_jacobian(&self, qs: &Joints) -> Matrix3x6<f64> {
        crate::jacobian::compute_position_jacobian(self, qs, crate::jacobian::DEFAULT_EPSILON)
    }
}
