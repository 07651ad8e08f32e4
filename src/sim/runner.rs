use log::{debug, warn};
use nalgebra::SVector;

use crate::dynamics::state::{validate_state, PendulumParams, StateVector};
use crate::dynamics::{DoublePendulum, OdeSystem};
use crate::error::ConfigError;
use crate::sim::config::{SimConfig, Tolerances};
use crate::sim::grid::TimeGrid;
use crate::sim::integrator::Dopri5;
use crate::sim::trajectory::{PendulumTrajectory, SolveStatus, SolverStats, Trajectory};

// ---------------------------------------------------------------------------
// Grid-sampled integration
// ---------------------------------------------------------------------------

/// Integrate `system` from `y0` at the first grid instant to the last one,
/// reporting the interpolated state at every grid instant.
///
/// Breakdown never surfaces as an error: the returned trajectory simply
/// stops at the last grid instant the integrator got past, and its status
/// records where and why. The initial state is always the first sample.
pub fn solve<S, const D: usize>(
    system: &S,
    y0: SVector<f64, D>,
    grid: &TimeGrid,
    tol: &Tolerances,
) -> Trajectory<D>
where
    S: OdeSystem<D>,
{
    let times = grid.times();
    let n = times.len();

    let mut out_t = Vec::with_capacity(n);
    let mut out_y = Vec::with_capacity(n);

    let Some(&t0) = times.first() else {
        return Trajectory {
            times: out_t,
            states: out_y,
            requested: 0,
            status: SolveStatus::Completed,
            stats: SolverStats::default(),
        };
    };
    out_t.push(t0);
    out_y.push(y0);

    let t_end = grid.t_max();
    if n == 1 || t_end <= t0 {
        return Trajectory {
            times: out_t,
            states: out_y,
            requested: n,
            status: SolveStatus::Completed,
            stats: SolverStats::default(),
        };
    }

    let mut solver = match Dopri5::new(system, t0, y0, t_end, *tol) {
        Ok(solver) => solver,
        Err(reason) => {
            warn!("integration could not start at t={t0}: {reason}");
            return Trajectory {
                times: out_t,
                states: out_y,
                requested: n,
                status: SolveStatus::EarlyTerminated { at: t0, reason },
                stats: SolverStats { fn_evals: 1, ..Default::default() },
            };
        }
    };

    let mut next = 1;
    let mut status = SolveStatus::Completed;

    while next < n {
        match solver.advance() {
            Ok(step) => {
                while next < n && times[next] <= step.t_new {
                    out_t.push(times[next]);
                    out_y.push(step.eval(times[next]));
                    next += 1;
                }
            }
            Err(reason) => {
                let at = solver.t();
                warn!(
                    "integration stopped at t={at:.6} s ({reason}); {} of {n} samples produced",
                    out_y.len()
                );
                status = SolveStatus::EarlyTerminated { at, reason };
                break;
            }
        }
    }

    let stats = solver.stats();
    debug!(
        "solver: {} accepted, {} rejected, {} evaluations",
        stats.accepted_steps, stats.rejected_steps, stats.fn_evals
    );

    Trajectory {
        times: out_t,
        states: out_y,
        requested: n,
        status,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Double pendulum run
// ---------------------------------------------------------------------------

/// Validate inputs, build the time grid and integrate the double pendulum.
pub fn simulate(
    params: &PendulumParams,
    y0: &StateVector,
    config: &SimConfig,
) -> Result<PendulumTrajectory, ConfigError> {
    params.validate()?;
    validate_state(y0)?;
    config.validate()?;

    let grid = TimeGrid::new(config.t_max, config.fps)?;
    debug!(
        "solving {} samples over [0, {}] s with rtol={} atol={}",
        grid.len(),
        config.t_max,
        config.tolerances.rtol,
        config.tolerances.atol
    );

    let system = DoublePendulum::new(*params);
    Ok(solve(&system, *y0, &grid, &config.tolerances))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
