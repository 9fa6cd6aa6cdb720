//! Assembles the nonlinear program for one planning request.
//!
//! Decision variables are the joint angles of all samples, stored column after column in
//! a flat vector: joint `j` of sample `k` is `u[k * 6 + j]`. The objective is the sum of
//! squared differences between consecutive samples. Joint limits and waypoint pinning are
//! bounds on the variables (a pinned variable has equal lower and upper bound), obstacle
//! clearance is the nonlinear map `F1(u) >= min_clearance^2`, one entry per sample and box.

use crate::jacobian::Jacobian;
use crate::kinematic_traits::{Joints, Kinematics, JOINT_COUNT};
use crate::interpolator::Interpolator;
use crate::planning::request::PlanningRequest;
use crate::planning_error::PlanningError;
use nalgebra::Vector3;

/// Pinned variables may differ from their waypoint by this much (radians) after solving.
const PIN_TOLERANCE: f64 = 1e-9;

pub struct TrajectoryProblem<'a> {
    request: PlanningRequest,
    kinematics: &'a dyn Kinematics,
    lower: Vec<f64>,
    upper: Vec<f64>,
    clearance_floor: Vec<f64>,
}

/// Joint values of sample `k`.
pub fn column(u: &[f64], k: usize) -> Joints {
    std::array::from_fn(|j| u[k * JOINT_COUNT + j])
}

impl<'a> TrajectoryProblem<'a> {
    /// Builds the program. Fails with a format error on a malformed request before
    /// anything else is constructed.
    pub fn build(request: PlanningRequest, kinematics: &'a dyn Kinematics)
                 -> Result<Self, PlanningError> {
        request.validate()?;

        let samples = request.sample_count();
        let limits = request.limits();
        let mut lower = Vec::with_capacity(samples * JOINT_COUNT);
        let mut upper = Vec::with_capacity(samples * JOINT_COUNT);
        for _ in 0..samples {
            lower.extend_from_slice(&limits.from);
            upper.extend_from_slice(&limits.to);
        }

        // Waypoint equality: collapse the bounds of pinned samples onto the waypoint.
        for (i, waypoint) in request.waypoints().iter().enumerate() {
            let offset = request.pinned_index(i) * JOINT_COUNT;
            lower[offset..offset + JOINT_COUNT].copy_from_slice(waypoint);
            upper[offset..offset + JOINT_COUNT].copy_from_slice(waypoint);
        }

        let floor = request.min_clearance() * request.min_clearance();
        let clearance_floor = vec![floor; samples * request.obstacles().len()];

        Ok(TrajectoryProblem { request, kinematics, lower, upper, clearance_floor })
    }

    pub fn request(&self) -> &PlanningRequest {
        &self.request
    }

    pub fn sample_count(&self) -> usize {
        self.request.sample_count()
    }

    /// Number of decision variables, six per sample.
    pub fn variable_count(&self) -> usize {
        self.sample_count() * JOINT_COUNT
    }

    /// Number of clearance constraints, one per sample and obstacle. Zero without obstacles.
    pub fn constraint_count(&self) -> usize {
        self.clearance_floor.len()
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    /// Lower end of the clearance set, `min_clearance^2` for every constraint.
    pub fn clearance_floor(&self) -> &[f64] {
        &self.clearance_floor
    }

    /// Sum of squared joint differences between consecutive samples.
    pub fn cost(&self, u: &[f64]) -> f64 {
        u.chunks_exact(JOINT_COUNT)
            .zip(u.chunks_exact(JOINT_COUNT).skip(1))
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| (y - x) * (y - x)).sum::<f64>())
            .sum()
    }

    pub fn cost_gradient(&self, u: &[f64], gradient: &mut [f64]) {
        gradient.iter_mut().for_each(|g| *g = 0.0);
        let n = self.sample_count();
        for k in 0..n.saturating_sub(1) {
            for j in 0..JOINT_COUNT {
                let here = k * JOINT_COUNT + j;
                let next = here + JOINT_COUNT;
                let delta = 2.0 * (u[next] - u[here]);
                gradient[here] -= delta;
                gradient[next] += delta;
            }
        }
    }

    /// Evaluates the clearance map: `out[k * boxes + b]` is the squared distance of the tcp
    /// at sample `k` to obstacle `b`.
    pub fn clearance_map(&self, u: &[f64], out: &mut [f64]) {
        let obstacles = self.request.obstacles();
        if obstacles.is_empty() {
            return;
        }
        for k in 0..self.sample_count() {
            let tcp = self.kinematics.tcp_position(&column(u, k));
            for (b, obstacle) in obstacles.iter().enumerate() {
                out[k * obstacles.len() + b] = obstacle.clearance_squared(&tcp);
            }
        }
    }

    /// Product of the transposed Jacobian of the clearance map with `d`. Each constraint
    /// only depends on its own sample, so the result is assembled sample by sample.
    pub fn clearance_jacobian_product(&self, u: &[f64], d: &[f64], out: &mut [f64]) {
        out.iter_mut().for_each(|o| *o = 0.0);
        let obstacles = self.request.obstacles();
        if obstacles.is_empty() {
            return;
        }
        for k in 0..self.sample_count() {
            let joints = column(u, k);
            let tcp = self.kinematics.tcp_position(&joints);
            let mut cartesian = Vector3::zeros();
            for (b, obstacle) in obstacles.iter().enumerate() {
                let weight = d[k * obstacles.len() + b];
                if weight != 0.0 {
                    cartesian += obstacle.clearance_squared_gradient(&tcp) * weight;
                }
            }
            if cartesian == Vector3::zeros() {
                continue;
            }
            let gradient = Jacobian::new(self.kinematics, &joints).joint_gradient(&cartesian);
            out[k * JOINT_COUNT..(k + 1) * JOINT_COUNT].copy_from_slice(&gradient);
        }
    }

    /// Waypoints are fixed, so their feasibility is known before solving. Reports a
    /// waypoint outside its joint limits or too close to an obstacle.
    pub fn check_pinned(&self) -> Result<(), PlanningError> {
        let limits = self.request.limits();
        let min_clearance = self.request.min_clearance();
        for (i, waypoint) in self.request.waypoints().iter().enumerate() {
            if let Some(j) = limits.first_violation(waypoint, 0.0) {
                return Err(PlanningError::infeasible(format!(
                    "waypoint {} has joint {} at {:.2} deg, outside [{:.2}, {:.2}] deg",
                    i, j + 1, waypoint[j].to_degrees(),
                    limits.from[j].to_degrees(), limits.to[j].to_degrees()
                )));
            }
            let tcp = self.kinematics.tcp_position(waypoint);
            for (b, obstacle) in self.request.obstacles().iter().enumerate() {
                if obstacle.contains(&tcp) {
                    return Err(PlanningError::infeasible(format!(
                        "waypoint {} places the tool at ({:.3}, {:.3}, {:.3}), inside obstacle {}",
                        i, tcp.x, tcp.y, tcp.z, b
                    )));
                }
                if obstacle.clearance_squared(&tcp) < min_clearance * min_clearance {
                    return Err(PlanningError::infeasible(format!(
                        "waypoint {} places the tool at ({:.3}, {:.3}, {:.3}), {:.3} m from obstacle {} \
                        where {:.3} m are required",
                        i, tcp.x, tcp.y, tcp.z, obstacle.clearance(&tcp), b, min_clearance
                    )));
                }
            }
        }
        Ok(())
    }

    /// Piecewise linear interpolation through the waypoints, clamped into the bounds.
    pub fn initial_guess(&self) -> Vec<f64> {
        let waypoints = self.request.waypoints().to_vec();
        let samples = match Interpolator::new(waypoints) {
            Some(interpolator) => interpolator.sample(self.request.steps_between_waypoints()),
            None => return self.lower.clone(),
        };
        let limits = self.request.limits();
        let mut guess: Vec<f64> = samples.iter()
            .flat_map(|sample| limits.clamp(sample))
            .collect();
        for (i, value) in guess.iter_mut().enumerate() {
            *value = value.clamp(self.lower[i], self.upper[i]);
        }
        guess
    }

    /// Describes the first constraint the point violates, None if it satisfies all of them.
    /// Clearance is allowed to fall short by `clearance_tolerance` meters.
    pub fn first_violation(&self, u: &[f64], clearance_tolerance: f64) -> Option<String> {
        if u.len() != self.variable_count() || u.iter().any(|v| !v.is_finite()) {
            return Some("solution contains non-finite values".to_string());
        }
        for (i, waypoint) in self.request.waypoints().iter().enumerate() {
            let k = self.request.pinned_index(i);
            let sample = column(u, k);
            if (0..JOINT_COUNT).any(|j| (sample[j] - waypoint[j]).abs() > PIN_TOLERANCE) {
                return Some(format!("sample {} does not match waypoint {}", k, i));
            }
        }
        let limits = self.request.limits();
        let required = (self.request.min_clearance() - clearance_tolerance).max(0.0);
        for k in 0..self.sample_count() {
            let joints = column(u, k);
            if let Some(j) = limits.first_violation(&joints, PIN_TOLERANCE) {
                return Some(format!("sample {} has joint {} outside its limits", k, j + 1));
            }
            let tcp = self.kinematics.tcp_position(&joints);
            for (b, obstacle) in self.request.obstacles().iter().enumerate() {
                if obstacle.contains(&tcp) {
                    return Some(format!("sample {} places the tool inside obstacle {}", k, b));
                }
                let clearance = obstacle.clearance(&tcp);
                if clearance < required {
                    return Some(format!(
                        "sample {} keeps only {:.4} m from obstacle {}, {:.4} m required",
                        k, clearance, b, self.request.min_clearance()
                    ));
                }
            }
        }
        None
    }

    /// Splits the flat variable vector into samples.
    pub fn columns(&self, u: &[f64]) -> Vec<Joints> {
        (0..self.sample_count()).map(|k| column(u, k)).collect()
    }
}
