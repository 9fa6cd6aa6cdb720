//! Validated input of a single planning call.

use crate::constraints::Constraints;
use crate::kinematic_traits::{Joints, JOINT_COUNT};
use crate::obstacle::ObstacleBox;
use crate::planning_error::PlanningError;
use crate::utils::dh_kinematics::is_valid;
use crate::utils::joints_from_slice;

/// Everything the problem builder needs, in radians and meters. The request is checked
/// once when created and cannot be changed afterwards.
#[derive(Debug, Clone)]
pub struct PlanningRequest {
    waypoints: Vec<Joints>,
    steps_between_waypoints: usize,
    limits: Constraints,
    obstacles: Vec<ObstacleBox>,
    min_clearance: f64,
}

impl PlanningRequest {
    /// Validates and creates the request. Waypoints are in radians, each must have
    /// exactly six values.
    pub fn new<W: AsRef<[f64]>>(
        waypoints: &[W],
        steps_between_waypoints: usize,
        limits: Constraints,
        obstacles: Vec<ObstacleBox>,
        min_clearance: f64,
    ) -> Result<Self, PlanningError> {
        if waypoints.len() < 2 {
            return Err(PlanningError::format(format!(
                "at least 2 waypoints are required, {} given", waypoints.len()
            )));
        }

        let mut checked = Vec::with_capacity(waypoints.len());
        for (i, waypoint) in waypoints.iter().enumerate() {
            let values = waypoint.as_ref();
            let joints = joints_from_slice(values).ok_or_else(|| PlanningError::format(format!(
                "waypoint {} has {} joint values, {} expected", i, values.len(), JOINT_COUNT
            )))?;
            checked.push(joints);
        }

        let request = PlanningRequest {
            waypoints: checked,
            steps_between_waypoints,
            limits,
            obstacles,
            min_clearance,
        };
        request.validate()?;
        Ok(request)
    }

    /// Checks everything except the waypoint dimensions that the type already guarantees.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.waypoints.len() < 2 {
            return Err(PlanningError::format(format!(
                "at least 2 waypoints are required, {} given", self.waypoints.len()
            )));
        }
        if self.steps_between_waypoints == 0 {
            return Err(PlanningError::format("steps between waypoints must be positive"));
        }
        let samples = (self.waypoints.len() - 1)
            .checked_mul(self.steps_between_waypoints)
            .and_then(|n| n.checked_add(1))
            .and_then(|n| n.checked_mul(JOINT_COUNT));
        if samples.is_none() {
            return Err(PlanningError::format(format!(
                "{} steps between {} waypoints is too many samples",
                self.steps_between_waypoints, self.waypoints.len()
            )));
        }
        if let Some(i) = self.waypoints.iter().position(|w| !is_valid(w)) {
            return Err(PlanningError::format(format!("waypoint {} contains non-finite values", i)));
        }
        if let Some(j) = self.limits.first_invalid() {
            return Err(PlanningError::format(format!(
                "joint {} limits [{}, {}] do not form a valid range",
                j + 1, self.limits.from[j], self.limits.to[j]
            )));
        }
        if let Some(b) = self.obstacles.iter().position(|o| !o.is_valid()) {
            return Err(PlanningError::format(format!(
                "obstacle {} has invalid extents {:?}", b, self.obstacles[b].extents()
            )));
        }
        if !(self.min_clearance.is_finite() && self.min_clearance >= 0.0) {
            return Err(PlanningError::format(format!(
                "minimal clearance must be a non-negative number, got {}", self.min_clearance
            )));
        }
        Ok(())
    }

    pub fn waypoints(&self) -> &[Joints] {
        &self.waypoints
    }

    pub fn steps_between_waypoints(&self) -> usize {
        self.steps_between_waypoints
    }

    pub fn limits(&self) -> &Constraints {
        &self.limits
    }

    pub fn obstacles(&self) -> &[ObstacleBox] {
        &self.obstacles
    }

    pub fn min_clearance(&self) -> f64 {
        self.min_clearance
    }

    /// Number of trajectory samples, `(waypoints - 1) * steps + 1`.
    pub fn sample_count(&self) -> usize {
        (self.waypoints.len() - 1) * self.steps_between_waypoints + 1
    }

    /// Sample index at which waypoint `i` is pinned.
    pub fn pinned_index(&self, waypoint: usize) -> usize {
        waypoint * self.steps_between_waypoints
    }
}
