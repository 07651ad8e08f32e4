use crate::dynamics::state::{PendulumParams, StateVector, OMEGA1, OMEGA2, THETA1, THETA2};
use crate::dynamics::OdeSystem;

// ---------------------------------------------------------------------------
// Double pendulum equations of motion
// ---------------------------------------------------------------------------

/// Compute `(omega1, omega2, domega1/dt, domega2/dt)` for a frictionless
/// double pendulum of point masses on rigid massless rods.
///
/// Angles are measured from the downward vertical. With `delta = theta1 - theta2`
/// and `M = m1 + m2` the Euler-Lagrange equations give
///
/// ```text
/// a1 = (-m2 L1 w1^2 sin d cos d + m2 g sin th2 cos d - m2 L2 w2^2 sin d - M g sin th1)
///      / (M L1 - m2 L1 cos^2 d)
/// a2 = ( m2 L2 w2^2 sin d cos d + M (g sin th1 cos d + L1 w1^2 sin d - g sin th2))
///      / (M L2 - m2 L2 cos^2 d)
/// ```
///
/// No clamping is applied. Parameters outside their valid range can make the
/// denominators vanish, in which case the result is non-finite and the solver
/// treats it as breakdown.
pub fn derivatives(_t: f64, y: &StateVector, p: &PendulumParams) -> StateVector {
    let th1 = y[THETA1];
    let th2 = y[THETA2];
    let w1 = y[OMEGA1];
    let w2 = y[OMEGA2];

    let delta = th1 - th2;
    let (sin_d, cos_d) = delta.sin_cos();
    let m = p.m1 + p.m2;

    let centrifugal_1 = -p.m2 * p.l1 * w1 * w1 * sin_d * cos_d;
    let gravity_coupling_1 = p.m2 * p.g * th2.sin() * cos_d;
    let coupling_1 = -p.m2 * p.l2 * w2 * w2 * sin_d;
    let gravity_1 = m * p.g * th1.sin();
    let num_1 = centrifugal_1 + gravity_coupling_1 + coupling_1 - gravity_1;
    let den_1 = m * p.l1 - p.m2 * p.l1 * cos_d * cos_d;

    let centrifugal_2 = p.m2 * p.l2 * w2 * w2 * sin_d * cos_d;
    let coupling_2 = m * (p.g * th1.sin() * cos_d + p.l1 * w1 * w1 * sin_d - p.g * th2.sin());
    let num_2 = centrifugal_2 + coupling_2;
    let den_2 = m * p.l2 - p.m2 * p.l2 * cos_d * cos_d;

    StateVector::new(w1, w2, num_1 / den_1, num_2 / den_2)
}

/// The double pendulum as an [`OdeSystem`] for the adaptive solver.
#[derive(Debug, Clone, Copy)]
pub struct DoublePendulum {
    pub params: PendulumParams,
}

impl DoublePendulum {
    pub fn new(params: PendulumParams) -> Self {
        Self { params }
    }
}

impl OdeSystem<4> for DoublePendulum {
    fn rhs(&self, t: f64, y: &StateVector) -> StateVector {
        derivatives(t, y, &self.params)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{reference_initial_state, state};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn hanging_at_rest_is_equilibrium() {
        let p = PendulumParams::default();
        let d = derivatives(0.0, &state(0.0, 0.0, 0.0, 0.0), &p);
        assert_eq!(d, StateVector::zeros());
    }

    #[test]
    fn velocities_pass_through() {
        let p = PendulumParams::default();
        let d = derivatives(0.0, &state(0.3, -0.2, 1.25, -0.75), &p);
        assert_eq!(d[THETA1], 1.25);
        assert_eq!(d[THETA2], -0.75);
    }

    #[test]
    fn deterministic_and_time_invariant() {
        let p = PendulumParams::default();
        let y = reference_initial_state();
        let a = derivatives(0.0, &y, &p);
        let b = derivatives(0.0, &y, &p);
        let c = derivatives(42.0, &y, &p);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn aligned_arms_fall_like_simple_pendulum() {
        // With both arms at the same angle and at rest, delta = 0 and the
        // first arm sees -g sin(theta) / L1 while the second stays aligned.
        let p = PendulumParams::default();
        let th = 0.4_f64;
        let d = derivatives(0.0, &state(th, th, 0.0, 0.0), &p);
        assert_relative_eq!(d[OMEGA1], -p.g * th.sin() / p.l1, epsilon = 1e-12);
        assert_relative_eq!(d[OMEGA2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn restoring_acceleration_for_small_displacement() {
        let p = PendulumParams::default();
        let d = derivatives(0.0, &state(0.05, 0.05, 0.0, 0.0), &p);
        assert!(d[OMEGA1] < 0.0, "first arm should swing back toward vertical");
    }

    #[test]
    fn mirror_symmetry() {
        let p = PendulumParams::default();
        let y = state(0.7, -0.4, 1.1, -2.0);
        let d = derivatives(0.0, &y, &p);
        let dm = derivatives(0.0, &(-y), &p);
        assert_relative_eq!(d, -dm, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_mass_yields_non_finite() {
        // m1 = 0 with aligned arms makes both denominators exactly zero.
        let p = PendulumParams { m1: 0.0, ..Default::default() };
        let d = derivatives(0.0, &state(PI / 4.0, PI / 4.0, 0.0, 0.0), &p);
        assert!(!d[OMEGA1].is_finite());
        assert!(!d[OMEGA2].is_finite());
    }

    #[test]
    fn ode_system_matches_free_function() {
        let p = PendulumParams::default();
        let y = reference_initial_state();
        let sys = DoublePendulum::new(p);
        assert_eq!(sys.rhs(1.5, &y), derivatives(1.5, &y, &p));
    }
}
