//! Helper functions

use crate::kinematic_traits::Joints;
use nalgebra::Vector6;

/// Tolerance, in degrees per joint, the execution layer uses to decide that the robot
/// has arrived at a trajectory sample.
pub const ARRIVAL_TOLERANCE_DEG: f64 = 0.5;

/// Checks the solution for validity.
pub(crate) mod dh_kinematics {
    use crate::kinematic_traits::Joints;

    /// Checks if all elements in the array are finite
    pub fn is_valid(qs: &Joints) -> bool {
        qs.iter().all(|&q| q.is_finite())
    }
}

/// Convert array of f64's in degrees to Joints in radians
pub fn joints(angles: &[f64; 6]) -> Joints {
    angles.map(f64::to_radians)
}

/// Convert joints in radians to array of f64's in degrees
pub fn to_degrees(angles: &Joints) -> [f64; 6] {
    angles.map(f64::to_degrees)
}

/// Converts a slice of exactly six values into Joints, None on any other length.
pub fn joints_from_slice(values: &[f64]) -> Option<Joints> {
    <Joints>::try_from(values).ok()
}

/// Formats joint values given in degrees as `[  0.00,  90.00, ...]`.
pub fn format_degrees(degrees: &[f64; 6]) -> String {
    let row = degrees.iter()
        .map(|value| format!("{:7.2}", value))
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", row)
}

/// Print joint values of all samples of the trajectory, joints given in degrees.
/// This is the listing an operator reads, one line per sample.
pub fn dump_trajectory_degrees(samples: &[[f64; 6]]) {
    if samples.is_empty() {
        println!("No samples");
    }
    for (index, sample) in samples.iter().enumerate() {
        println!("Sample {}: {}", index, format_degrees(sample));
    }
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub fn as_radians(degrees: [i32; 6]) -> Joints {
    std::array::from_fn(|i| (degrees[i] as f64).to_radians())
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}

/// Converts ```nalgebra::Vector6<f64>``` to Joints ([f64; 6])
pub fn vector6_to_joints(v: Vector6<f64>) -> Joints {
    [v[0], v[1], v[2], v[3], v[4], v[5]]
}


/// True if every measured joint (degrees) is within `tolerance_deg` of the target (degrees).
/// The execution layer blocks on this before sending the next trajectory sample.
pub fn reached(actual_deg: &[f64; 6], target_deg: &[f64; 6], tolerance_deg: f64) -> bool {
    actual_deg.iter()
        .zip(target_deg.iter())
        .all(|(actual, target)| (actual - target).abs() <= tolerance_deg)
}

/// Largest absolute per-joint difference between two configurations.
pub fn max_joint_difference(from: &Joints, to: &Joints) -> f64 {
    from.iter()
        .zip(to.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
