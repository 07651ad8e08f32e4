use crate::dynamics::state::{PendulumParams, StateVector, OMEGA1, OMEGA2, THETA1, THETA2};
use crate::sim::trajectory::PendulumTrajectory;

/// Caption describing the starting configuration of a run.
pub fn initial_conditions_text(params: &PendulumParams, y0: &StateVector) -> String {
    format!(
        "Initial Conditions:\n  \u{3b8}1: {:.1}\u{b0}\n  \u{3b8}2: {:.1}\u{b0}\n  \u{3c9}1: {} rad/s\n  \u{3c9}2: {} rad/s\n  M1={} kg, M2={} kg",
        y0[THETA1].to_degrees(),
        y0[THETA2].to_degrees(),
        y0[OMEGA1],
        y0[OMEGA2],
        params.m1,
        params.m2,
    )
}

/// Notice for a trajectory that ended before the requested duration.
pub fn breakdown_notice(trajectory: &PendulumTrajectory) -> Option<String> {
    if !trajectory.is_truncated() {
        return None;
    }
    Some(format!(
        "Initial conditions too chaotic for the integrator error tolerance. \
         Rendering the {} of {} frames computed before breakdown.",
        trajectory.len(),
        trajectory.requested()
    ))
}
