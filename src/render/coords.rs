use nalgebra::Point2;

use crate::dynamics::state::{PendulumParams, StateVector, THETA1, THETA2};

/// Bob positions in metres, pivot at the origin, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BobPositions {
    pub bob1: Point2<f64>,
    pub bob2: Point2<f64>,
}

/// Place both bobs from the arm angles. Angular velocities are ignored.
pub fn to_cartesian(y: &StateVector, p: &PendulumParams) -> BobPositions {
    let (s1, c1) = y[THETA1].sin_cos();
    let (s2, c2) = y[THETA2].sin_cos();
    let bob1 = Point2::new(p.l1 * s1, -p.l1 * c1);
    let bob2 = Point2::new(bob1.x + p.l2 * s2, bob1.y - p.l2 * c2);
    BobPositions { bob1, bob2 }
}

/// Recover `(theta1, theta2)` in `(-pi, pi]` from bob positions.
pub fn from_cartesian(pos: &BobPositions) -> (f64, f64) {
    let arm2 = pos.bob2 - pos.bob1;
    let theta1 = pos.bob1.x.atan2(-pos.bob1.y);
    let theta2 = arm2.x.atan2(-arm2.y);
    (theta1, theta2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::state;
    use approx::assert_relative_eq;
    use std::f64::consts::{PI, TAU};

    fn wrap(a: f64) -> f64 {
        let w = a.rem_euclid(TAU);
        if w > PI {
            w - TAU
        } else {
            w
        }
    }

    #[test]
    fn hanging_straight_down() {
        let p = PendulumParams::default();
        let pos = to_cartesian(&state(0.0, 0.0, 1.0, 1.0), &p);
        assert_relative_eq!(pos.bob1, Point2::new(0.0, -p.l1));
        assert_relative_eq!(pos.bob2, Point2::new(0.0, -p.reach()));
    }

    #[test]
    fn horizontal_first_arm() {
        let p = PendulumParams::default();
        let pos = to_cartesian(&state(PI / 2.0, 0.0, 0.0, 0.0), &p);
        assert_relative_eq!(pos.bob1.x, p.l1, epsilon = 1e-12);
        assert_relative_eq!(pos.bob1.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pos.bob2.y, -p.l2, epsilon = 1e-12);
    }

    #[test]
    fn arm_lengths_preserved() {
        let p = PendulumParams::default();
        let pos = to_cartesian(&state(2.1, -0.7, 0.0, 0.0), &p);
        assert_relative_eq!(pos.bob1.coords.norm(), p.l1, epsilon = 1e-12);
        assert_relative_eq!((pos.bob2 - pos.bob1).norm(), p.l2, epsilon = 1e-12);
    }

    #[test]
    fn round_trip_recovers_angles_modulo_two_pi() {
        let p = PendulumParams::default();
        for &(th1, th2) in &[(0.3, -1.2), (PI / 3.0, PI / 3.0 + 0.1), (7.5, -9.0), (-3.0, 3.0)] {
            let pos = to_cartesian(&state(th1, th2, 0.0, 0.0), &p);
            let (r1, r2) = from_cartesian(&pos);
            assert_relative_eq!(r1, wrap(th1), epsilon = 1e-12);
            assert_relative_eq!(r2, wrap(th2), epsilon = 1e-12);
        }
    }
}
