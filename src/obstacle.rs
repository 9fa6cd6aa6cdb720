//! Axis aligned keep-out boxes in the robot base frame.

use nalgebra::Vector3;

/// Axis aligned bounding box the tool center point must keep away from, meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleBox {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl ObstacleBox {
    /// Creates the box from its extents in the order used by the configuration files:
    /// `xmin, xmax, ymin, ymax, zmin, zmax`.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        ObstacleBox {
            min: Vector3::new(xmin, ymin, zmin),
            max: Vector3::new(xmax, ymax, zmax),
        }
    }

    pub fn from_extents(extents: &[f64; 6]) -> Self {
        let [xmin, xmax, ymin, ymax, zmin, zmax] = *extents;
        ObstacleBox::new(xmin, xmax, ymin, ymax, zmin, zmax)
    }

    /// Extents as `xmin, xmax, ymin, ymax, zmin, zmax`.
    pub fn extents(&self) -> [f64; 6] {
        [self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z]
    }

    /// Box that models the fixture of the default UR10 workcell.
    pub fn workcell_fixture() -> Self {
        ObstacleBox::new(-0.095, 0.115, -0.76, -0.70, 0.125, 0.325)
    }

    /// All extents finite and min not above max on every axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| self.min[i].is_finite() && self.max[i].is_finite()
            && self.min[i] <= self.max[i])
    }

    /// Per axis distance from the point to the box slab: `max(min - p, 0) + max(p - max, 0)`.
    /// Zero on every axis means the point is inside (or on the surface).
    pub fn outside_distance(&self, point: &Vector3<f64>) -> Vector3<f64> {
        Vector3::from_fn(|i, _| {
            (self.min[i] - point[i]).max(0.0) + (point[i] - self.max[i]).max(0.0)
        })
    }

    /// Squared Euclidean distance from the point to the box, zero inside.
    pub fn clearance_squared(&self, point: &Vector3<f64>) -> f64 {
        self.outside_distance(point).norm_squared()
    }

    pub fn clearance(&self, point: &Vector3<f64>) -> f64 {
        self.outside_distance(point).norm()
    }

    /// Gradient of `clearance_squared` with respect to the point. The squared distance is
    /// continuously differentiable, its gradient is `2 (p - clamp(p, box))`.
    pub fn clearance_squared_gradient(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let closest = Vector3::from_fn(|i, _| point[i].clamp(self.min[i], self.max[i]));
        (point - closest) * 2.0
    }

    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}
