use crate::kinematic_traits::Joints;

/// Piecewise linear path through the waypoints, used to seed the optimizer.
pub struct Interpolator {
    steps: Vec<Joints>, // The key points along the trajectory
}

pub fn interpolate_joints(start: &Joints, end: &Joints, t: f64) -> Joints {
    if t < 0.0 {
        return start.clone();
    } else if t > 1.0 {
        return end.clone();
    }

    let mut interpolated = [0.0; 6];
    for i in 0..6 {
        interpolated[i] = start[i] + t * (end[i] - start[i]);
    }
    interpolated
}

impl Interpolator {
    /// Create a new interpolator with given trajectory steps. Returns None if
    /// there are fewer than two steps.
    pub fn new(steps: Vec<Joints>) -> Option<Self> {
        if steps.len() < 2 {
            return None;
        }
        Some(Interpolator { steps })
    }

    /// Samples the path with `steps_between` samples per segment. Sample `i * steps_between`
    /// is exactly waypoint `i`, the total count is `(waypoints - 1) * steps_between + 1`.
    pub fn sample(&self, steps_between: usize) -> Vec<Joints> {
        let steps_between = steps_between.max(1);
        let mut samples = Vec::with_capacity((self.steps.len() - 1) * steps_between + 1);
        for segment in self.steps.windows(2) {
            for k in 0..steps_between {
                let t = k as f64 / steps_between as f64;
                samples.push(interpolate_joints(&segment[0], &segment[1], t));
            }
        }
        samples.push(self.steps[self.steps.len() - 1]);
        samples
    }
}
