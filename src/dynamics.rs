pub mod energy;
pub mod pendulum;
pub mod state;

use nalgebra::SVector;

pub use pendulum::{derivatives, DoublePendulum};
pub use state::{PendulumParams, StateVector};

/// Right-hand side of a first-order ODE system `dy/dt = f(t, y)`.
///
/// Implement this to drive the adaptive solver with a model of fixed
/// dimension `D`. Implementations must be pure: the solver may evaluate
/// them at trial states that are later rejected.
pub trait OdeSystem<const D: usize> {
    fn rhs(&self, t: f64, y: &SVector<f64, D>) -> SVector<f64, D>;
}
