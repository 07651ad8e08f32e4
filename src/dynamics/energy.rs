use crate::dynamics::state::{PendulumParams, StateVector, OMEGA1, OMEGA2, THETA1, THETA2};

/// Kinetic energy of both bobs (J).
pub fn kinetic(y: &StateVector, p: &PendulumParams) -> f64 {
    let (w1, w2) = (y[OMEGA1], y[OMEGA2]);
    let cos_d = (y[THETA1] - y[THETA2]).cos();
    0.5 * p.total_mass() * p.l1 * p.l1 * w1 * w1
        + 0.5 * p.m2 * p.l2 * p.l2 * w2 * w2
        + p.m2 * p.l1 * p.l2 * w1 * w2 * cos_d
}

/// Gravitational potential energy with the pivot as reference height (J).
pub fn potential(y: &StateVector, p: &PendulumParams) -> f64 {
    -p.total_mass() * p.g * p.l1 * y[THETA1].cos() - p.m2 * p.g * p.l2 * y[THETA2].cos()
}

/// Total mechanical energy (J). Conserved by the exact dynamics.
pub fn total(y: &StateVector, p: &PendulumParams) -> f64 {
    kinetic(y, p) + potential(y, p)
}

/// Largest deviation of total energy from its initial value, relative to the
/// energy scale `M g (L1 + L2)` so that runs near E = 0 stay meaningful.
pub fn max_relative_drift(states: &[StateVector], p: &PendulumParams) -> f64 {
    let Some(first) = states.first() else {
        return 0.0;
    };
    let e0 = total(first, p);
    let scale = p.total_mass() * p.g * p.reach();
    states
        .iter()
        .map(|y| (total(y, p) - e0).abs() / scale)
        .fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::state;
    use approx::assert_relative_eq;

    #[test]
    fn hanging_at_rest_is_minimum() {
        let p = PendulumParams::default();
        let e = total(&state(0.0, 0.0, 0.0, 0.0), &p);
        let expected = -(p.total_mass() * p.g * p.l1 + p.m2 * p.g * p.l2);
        assert_relative_eq!(e, expected, epsilon = 1e-12);
        assert!(total(&state(0.1, -0.1, 0.0, 0.0), &p) > e);
    }

    #[test]
    fn kinetic_is_non_negative() {
        let p = PendulumParams::default();
        for &(w1, w2) in &[(1.0, -1.0), (3.0, -2.5), (-0.2, 0.7)] {
            assert!(kinetic(&state(0.3, 2.9, w1, w2), &p) >= 0.0);
        }
    }

    #[test]
    fn constant_series_has_no_drift() {
        let p = PendulumParams::default();
        let y = state(0.4, 0.2, 0.1, 0.0);
        assert_eq!(max_relative_drift(&[y, y, y], &p), 0.0);
        assert_eq!(max_relative_drift(&[], &p), 0.0);
    }
}
