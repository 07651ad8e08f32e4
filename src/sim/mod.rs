pub mod config;
pub mod grid;
pub mod integrator;
pub mod runner;
pub mod trajectory;

pub use config::{SimConfig, Tolerances};
pub use grid::TimeGrid;
pub use integrator::{DenseStep, Dopri5};
pub use runner::{simulate, solve};
pub use trajectory::{Breakdown, PendulumTrajectory, SolveStatus, SolverStats, Trajectory};
