use std::f64::consts::PI;

use nalgebra::Vector4;

use crate::error::ParamError;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G_DEFAULT: f64 = 9.8; // m/s^2

// ---------------------------------------------------------------------------
// State vector: (theta1, theta2, omega1, omega2)
// ---------------------------------------------------------------------------

/// Angles from the downward vertical (rad) and angular velocities (rad/s).
pub type StateVector = Vector4<f64>;

pub const THETA1: usize = 0;
pub const THETA2: usize = 1;
pub const OMEGA1: usize = 2;
pub const OMEGA2: usize = 3;

const STATE_NAMES: [&str; 4] = ["theta1", "theta2", "omega1", "omega2"];

/// Build a state vector from its named components.
pub fn state(theta1: f64, theta2: f64, omega1: f64, omega2: f64) -> StateVector {
    StateVector::new(theta1, theta2, omega1, omega2)
}

/// The initial condition of the reference run: both arms near 60 degrees,
/// slightly offset, spinning at 0.5 rad/s.
pub fn reference_initial_state() -> StateVector {
    state(PI / 3.0, PI / 3.0 + 0.1, 0.5, 0.5)
}

/// Reject initial states the integrator could never start from.
pub fn validate_state(y: &StateVector) -> Result<(), ParamError> {
    for (name, &value) in STATE_NAMES.iter().zip(y.iter()) {
        if !value.is_finite() {
            return Err(ParamError::NonFiniteState { name, value });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Physical parameters
// ---------------------------------------------------------------------------

/// Gravity, arm lengths and bob masses. Fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    pub g: f64,  // m/s^2
    pub l1: f64, // m, pivot to bob 1
    pub l2: f64, // m, bob 1 to bob 2
    pub m1: f64, // kg
    pub m2: f64, // kg
}

impl PendulumParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        let fields = [
            ("g", self.g),
            ("l1", self.l1),
            ("l2", self.l2),
            ("m1", self.m1),
            ("m2", self.m2),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamError::NotPositive { name, value });
            }
        }
        Ok(())
    }

    pub fn total_mass(&self) -> f64 {
        self.m1 + self.m2
    }

    /// Fully extended reach of bob 2 from the pivot.
    pub fn reach(&self) -> f64 {
        self.l1 + self.l2
    }
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            g: G_DEFAULT,
            l1: 1.0,
            l2: 1.5,
            m1: 2.0,
            m2: 2.0,
        }
    }
}
