//! Errors reported by trajectory planning

/// Failure of a planning call. No partial trajectory is ever returned with an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// The request is malformed: too few waypoints, a waypoint without six values,
    /// zero steps between waypoints, empty joint ranges or non-finite numbers.
    /// Detected before any numerical work.
    FormatError(String),

    /// No trajectory satisfies all constraints, for instance a waypoint inside a keep-out
    /// box or outside the joint limits.
    InfeasibleProblem(String),

    /// The solver ran out of iterations or time, or hit a numerical failure, before
    /// reaching a feasible stationary point.
    ConvergenceFailure { reason: String, iterations: usize },
}

impl PlanningError {
    pub fn format(details: impl Into<String>) -> Self {
        PlanningError::FormatError(details.into())
    }

    pub fn infeasible(details: impl Into<String>) -> Self {
        PlanningError::InfeasibleProblem(details.into())
    }

    pub fn not_converged(reason: impl Into<String>, iterations: usize) -> Self {
        PlanningError::ConvergenceFailure { reason: reason.into(), iterations }
    }
}

impl std::fmt::Display for PlanningError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            PlanningError::FormatError(ref msg) =>
                write!(f, "Format Error: {}", msg),
            PlanningError::InfeasibleProblem(ref msg) =>
                write!(f, "Infeasible Problem: {}", msg),
            PlanningError::ConvergenceFailure { ref reason, iterations } =>
                write!(f, "Convergence Failure after {} iterations: {}", iterations, reason),
        }
    }
}

impl std::error::Error for PlanningError {}
