//! Numerical backend for the trajectory program.
//!
//! The program is solved with the augmented Lagrangian method of `optimization_engine`,
//! PANOC doing the inner bound-constrained minimization. Without obstacles there are no
//! nonlinear constraints and plain PANOC is used directly.

use crate::planning::trajectory_problem::TrajectoryProblem;
use crate::planning_error::PlanningError;
use optimization_engine::core::ExitStatus;
use optimization_engine::{alm::*, constraints::*, panoc::*, *};
use std::time::Duration;
use tracing::{debug, warn};

/// Tuning of the solver. Defaults work for a handful of waypoints with tens of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    /// Fixed point residual tolerance of the inner solver.
    pub tolerance: f64,
    /// Allowed infeasibility of the clearance constraints, in squared meters.
    pub constraint_tolerance: f64,
    /// Inner tolerance of the first outer iteration, shrinks towards `tolerance`.
    pub initial_inner_tolerance: f64,
    pub max_outer_iterations: usize,
    pub max_inner_iterations: usize,
    pub lbfgs_memory: usize,
    pub initial_penalty: f64,
    pub penalty_update_factor: f64,
    /// Radius of the box the Lagrange multipliers are kept in.
    pub max_multiplier: f64,
    /// Wall clock limit of one solve, unlimited if None.
    pub max_duration: Option<Duration>,
    /// A solution may miss the required clearance by this much (meters) and still be accepted.
    pub clearance_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            tolerance: 1e-6,
            constraint_tolerance: 1e-6,
            initial_inner_tolerance: 1e-3,
            max_outer_iterations: 50,
            max_inner_iterations: 2000,
            lbfgs_memory: 10,
            initial_penalty: 1e3,
            penalty_update_factor: 10.0,
            max_multiplier: 1e12,
            max_duration: None,
            clearance_tolerance: 1e-3,
        }
    }
}

/// Statistics of a successful minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub outer_iterations: usize,
    pub inner_iterations: usize,
    pub cost: f64,
}

/// Backend that minimizes a [`TrajectoryProblem`]. Implementors only provide the
/// minimization, `solve` wraps it with the checks every backend needs.
pub trait NlpSolver {
    /// Minimizes starting from `u`, leaving the result in `u`. Must fail with a
    /// convergence error if the backend stops without converging.
    fn minimize(&self, problem: &TrajectoryProblem, u: &mut [f64]) -> Result<SolveReport, PlanningError>;

    /// Tolerance for the final feasibility check, meters of clearance.
    fn clearance_tolerance(&self) -> f64 {
        1e-3
    }

    /// Checks the waypoints, seeds the solver with linear interpolation, minimizes and
    /// verifies the result. Returns the flat variable vector, column after column.
    fn solve(&self, problem: &TrajectoryProblem) -> Result<Vec<f64>, PlanningError> {
        problem.check_pinned()?;

        let mut u = problem.initial_guess();
        let report = self.minimize(problem, &mut u)?;
        debug!("Solved with {} outer and {} inner iterations, cost {:.6}",
            report.outer_iterations, report.inner_iterations, report.cost);

        if let Some(violation) = problem.first_violation(&u, self.clearance_tolerance()) {
            warn!("Solver converged to an infeasible point: {}", violation);
            return Err(PlanningError::infeasible(violation));
        }
        Ok(u)
    }
}

/// Augmented Lagrangian solver on top of `optimization_engine`.
#[derive(Debug, Clone, Default)]
pub struct AlmSolver {
    settings: SolverSettings,
}

impl AlmSolver {
    pub fn new(settings: SolverSettings) -> Self {
        AlmSolver { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn minimize_bounded(&self, problem: &TrajectoryProblem, u: &mut [f64])
                        -> Result<SolveReport, PlanningError> {
        let settings = &self.settings;
        let bounds = Rectangle::new(Some(problem.lower_bounds()), Some(problem.upper_bounds()));

        let cost = |u: &[f64], c: &mut f64| -> Result<(), SolverError> {
            *c = problem.cost(u);
            Ok(())
        };
        let gradient = |u: &[f64], g: &mut [f64]| -> Result<(), SolverError> {
            problem.cost_gradient(u, g);
            Ok(())
        };

        let mut cache = PANOCCache::new(problem.variable_count(), settings.tolerance,
                                        settings.lbfgs_memory);
        let panoc = Problem::new(&bounds, gradient, cost);
        let mut optimizer = PANOCOptimizer::new(panoc, &mut cache)
            .with_max_iter(settings.max_inner_iterations);
        if let Some(duration) = settings.max_duration {
            optimizer = optimizer.with_max_duration(duration);
        }

        let status = optimizer.solve(u).map_err(|err| {
            warn!("PANOC failed: {:?}", err);
            PlanningError::not_converged(format!("solver error {:?}", err), 0)
        })?;

        check_exit(status.exit_status(), status.iterations())?;
        Ok(SolveReport {
            outer_iterations: 1,
            inner_iterations: status.iterations(),
            cost: status.cost_value(),
        })
    }

    fn minimize_constrained(&self, problem: &TrajectoryProblem, u: &mut [f64])
                            -> Result<SolveReport, PlanningError> {
        let settings = &self.settings;
        let n = problem.variable_count();
        let n1 = problem.constraint_count();

        let cost = |u: &[f64], c: &mut f64| -> Result<(), SolverError> {
            *c = problem.cost(u);
            Ok(())
        };
        let gradient = |u: &[f64], g: &mut [f64]| -> Result<(), SolverError> {
            problem.cost_gradient(u, g);
            Ok(())
        };
        let clearance = |u: &[f64], out: &mut [f64]| -> Result<(), SolverError> {
            problem.clearance_map(u, out);
            Ok(())
        };
        let clearance_jacobian_t = |u: &[f64], d: &[f64], out: &mut [f64]| -> Result<(), SolverError> {
            problem.clearance_jacobian_product(u, d, out);
            Ok(())
        };

        let factory = AlmFactory::new(
            cost,
            gradient,
            Some(clearance),
            Some(clearance_jacobian_t),
            NO_MAPPING,
            NO_JACOBIAN_MAPPING,
            Some(Rectangle::new(Some(problem.clearance_floor()), None)),
            0,
        );

        let bounds = Rectangle::new(Some(problem.lower_bounds()), Some(problem.upper_bounds()));
        let alm_problem = AlmProblem::new(
            bounds,
            Some(Rectangle::new(Some(problem.clearance_floor()), None)),
            Some(BallInf::new(None, settings.max_multiplier)),
            |u: &[f64], xi: &[f64], c: &mut f64| -> Result<(), SolverError> {
                factory.psi(u, xi, c)
            },
            |u: &[f64], xi: &[f64], g: &mut [f64]| -> Result<(), SolverError> {
                factory.d_psi(u, xi, g)
            },
            Some(clearance),
            NO_MAPPING,
            n1,
            0,
        );

        let panoc_cache = PANOCCache::new(n, settings.tolerance, settings.lbfgs_memory);
        let mut cache = AlmCache::new(panoc_cache, n1, 0);
        let mut optimizer = AlmOptimizer::new(&mut cache, alm_problem)
            .with_delta_tolerance(settings.constraint_tolerance)
            .with_epsilon_tolerance(settings.tolerance)
            .with_initial_inner_tolerance(settings.initial_inner_tolerance.max(settings.tolerance))
            .with_max_outer_iterations(settings.max_outer_iterations)
            .with_max_inner_iterations(settings.max_inner_iterations)
            .with_initial_penalty(settings.initial_penalty)
            .with_penalty_update_factor(settings.penalty_update_factor);
        if let Some(duration) = settings.max_duration {
            optimizer = optimizer.with_max_duration(duration);
        }

        let status = optimizer.solve(u).map_err(|err| {
            warn!("ALM failed: {:?}", err);
            PlanningError::not_converged(format!("solver error {:?}", err), 0)
        })?;

        debug!("ALM finished: {:?}, {} outer, {} inner iterations, penalty {:.3e}",
            status.exit_status(), status.num_outer_iterations(),
            status.num_inner_iterations(), status.penalty());
        check_exit(status.exit_status(), status.num_inner_iterations())?;
        Ok(SolveReport {
            outer_iterations: status.num_outer_iterations(),
            inner_iterations: status.num_inner_iterations(),
            cost: status.cost(),
        })
    }
}

fn check_exit(status: ExitStatus, iterations: usize) -> Result<(), PlanningError> {
    match status {
        ExitStatus::Converged => Ok(()),
        ExitStatus::NotConvergedIterations => {
            warn!("Solver stopped after {} iterations without converging", iterations);
            Err(PlanningError::not_converged("iteration limit reached", iterations))
        }
        ExitStatus::NotConvergedOutOfTime => {
            warn!("Solver ran out of time after {} iterations", iterations);
            Err(PlanningError::not_converged("time limit reached", iterations))
        }
    }
}

impl NlpSolver for AlmSolver {
    fn minimize(&self, problem: &TrajectoryProblem, u: &mut [f64]) -> Result<SolveReport, PlanningError> {
        if problem.constraint_count() == 0 {
            self.minimize_bounded(problem, u)
        } else {
            self.minimize_constrained(problem, u)
        }
    }

    fn clearance_tolerance(&self) -> f64 {
        self.settings.clearance_tolerance
    }
}
