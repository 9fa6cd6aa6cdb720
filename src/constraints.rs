use std::f64::consts::PI;
use crate::kinematic_traits::Joints;

/// Per-joint angle limits, radians. Unlike the wrap-around ranges of a joint
/// encoder, these are plain intervals `from[i] ..= to[i]` as the optimizer treats
/// every joint value as a real number.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    /// Lower limit of each joint
    pub from: [f64; 6],

    /// Upper limit of each joint
    pub to: [f64; 6],
}

impl Constraints {
    pub fn new(from: [f64; 6], to: [f64; 6]) -> Self {
        Constraints { from, to }
    }

    /// Same `-limit ..= limit` range for every joint.
    pub fn symmetric(limit: f64) -> Self {
        Constraints::new([-limit; 6], [limit; 6])
    }

    /// Index of the first joint with a range that is empty or not finite, None if all good.
    pub fn first_invalid(&self) -> Option<usize> {
        (0..6).find(|&i| {
            !(self.from[i].is_finite() && self.to[i].is_finite()) || self.from[i] > self.to[i]
        })
    }

    pub fn compliant(&self, angles: &Joints) -> bool {
        self.first_violation(angles, 0.0).is_none()
    }

    /// Index of the first joint outside its range by more than `tolerance`.
    pub fn first_violation(&self, angles: &Joints, tolerance: f64) -> Option<usize> {
        (0..6).find(|&i| {
            !(angles[i] >= self.from[i] - tolerance && angles[i] <= self.to[i] + tolerance)
        })
    }

    /// Clamps every joint into its range.
    pub fn clamp(&self, angles: &Joints) -> Joints {
        std::array::from_fn(|i| angles[i].clamp(self.from[i], self.to[i]))
    }
}

impl Default for Constraints {
    /// Full turn in either direction for every joint.
    fn default() -> Self {
        Constraints::symmetric(PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_limits() {
        let angles = [0.1 * PI, 0.2 * PI, 0.3 * PI, 0.4 * PI, 0.5 * PI, 0.6 * PI];
        let from = [0.0, 0.15 * PI, 0.25 * PI, 0.35 * PI, 0.45 * PI, 0.55 * PI];
        let to = [0.2 * PI, 0.3 * PI, 0.4 * PI, 0.5 * PI, 0.6 * PI, 0.7 * PI];
        let limits = Constraints::new(from, to);
        assert!(limits.compliant(&angles));
    }

    #[test]
    fn test_no_wrap_around() {
        // A range from 0.8 PI to 0.1 PI is empty here, it does not pass through zero.
        let limits = Constraints::new([0.8 * PI; 6], [0.1 * PI; 6]);
        assert_eq!(limits.first_invalid(), Some(0));
        assert!(!limits.compliant(&[0.9 * PI; 6]));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = Constraints::default();
        assert!(limits.compliant(&[PI, -PI, PI, -PI, 0.0, 0.0]));
        assert_eq!(limits.first_violation(&[0.0, 0.0, 0.0, 1.01 * PI, 0.0, 0.0], 0.0), Some(3));
        assert_eq!(limits.first_violation(&[0.0, 0.0, 0.0, 1.01 * PI, 0.0, 0.0], 0.1), None);
    }

    #[test]
    fn test_invalid_ranges() {
        let mut limits = Constraints::symmetric(1.0);
        assert_eq!(limits.first_invalid(), None);
        limits.to[4] = f64::NAN;
        assert_eq!(limits.first_invalid(), Some(4));
    }

    #[test]
    fn test_clamp() {
        let limits = Constraints::new([-1.0, 0.0, 0.0, 0.0, 0.0, 0.0], [1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(limits.clamp(&[-3.0, 3.0, 1.0, 0.0, 2.0, -0.5]), [-1.0, 2.0, 1.0, 0.0, 2.0, 0.0]);
    }
}
