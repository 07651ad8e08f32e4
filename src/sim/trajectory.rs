use std::fmt;

use nalgebra::SVector;

use crate::dynamics::state::StateVector;

// ---------------------------------------------------------------------------
// Solver outcome
// ---------------------------------------------------------------------------

/// Why the integrator stopped before reaching the end of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    /// Error control demanded a step below the floating-point spacing of t.
    StepSizeUnderflow,
    /// The right-hand side returned NaN or infinity and could not be stepped around.
    NonFiniteDerivative,
    /// The configured step budget ran out.
    MaxStepsExceeded,
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Breakdown::StepSizeUnderflow => "required step size is below the spacing of representable times",
            Breakdown::NonFiniteDerivative => "derivative became non-finite",
            Breakdown::MaxStepsExceeded => "step budget exhausted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveStatus {
    Completed,
    EarlyTerminated { at: f64, reason: Breakdown },
}

/// Work counters reported by the adaptive integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub fn_evals: usize,
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Solution sampled on the requested grid. Holds at most `requested`
/// samples; fewer means integration broke down part way.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<const D: usize> {
    pub(crate) times: Vec<f64>,
    pub(crate) states: Vec<SVector<f64, D>>,
    pub(crate) requested: usize,
    pub(crate) status: SolveStatus,
    pub(crate) stats: SolverStats,
}

/// Trajectory of the double pendulum state `(theta1, theta2, omega1, omega2)`.
pub type PendulumTrajectory = Trajectory<4>;

impl<const D: usize> Trajectory<D> {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[SVector<f64, D>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of grid instants that were asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// True when fewer samples were produced than requested.
    pub fn is_truncated(&self) -> bool {
        self.len() < self.requested
    }

    pub fn last(&self) -> Option<(f64, &SVector<f64, D>)> {
        self.times.last().copied().zip(self.states.last())
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &SVector<f64, D>)> {
        self.times.iter().copied().zip(self.states.iter())
    }
}

impl PendulumTrajectory {
    pub fn initial_state(&self) -> Option<&StateVector> {
        self.states.first()
    }
}
